//! Common test utilities for skusync integration tests.
//!
//! Provides `TestEnv`: an isolated temp directory with local/remote data
//! files, plus helpers to run the skusync binary against it.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running a skusync CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with a temp working directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Path relative to the environment root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file into the environment
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write test file");
    }

    /// Read a file from the environment
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
    }

    /// Run the skusync binary from the environment root
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_skusync"))
            .current_dir(self.dir.path())
            .args(args)
            .output()
            .expect("failed to execute skusync");
        output_to_result(output)
    }

    /// Paths of the per-run JSON artifacts in the default log dir
    pub fn artifacts(&self) -> Vec<PathBuf> {
        let logs = self.path("logs");
        let Ok(entries) = std::fs::read_dir(&logs) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "json")
                    && p.file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with("sync-"))
            })
            .collect();
        paths.sort();
        paths
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Local inventory fixture: two priced items
pub const TWO_ITEMS: &str = r#"[
  {"sku": "sku-1", "price": 9.99, "status": "active", "updated_at": "2025-10-05"},
  {"sku": "sku-2", "price": 4.50, "status": "active", "updated_at": "2025-09-01"}
]"#;
