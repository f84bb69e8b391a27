//! Configuration loading for skusync
//!
//! Configuration lives in `skusync.toml` next to the data files. Every
//! field has a default, so a missing file is a valid (default) config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SkuSyncError, SkuSyncResult};

/// Default config file name
pub const CONFIG_FILE: &str = "skusync.toml";

/// Prefixes that mark a credential value as a placeholder
const PLACEHOLDER_PREFIXES: [&str; 3] = ["YOUR_", "PLACEHOLDER", "XXX"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for run artifacts and the rolling log
    pub log_dir: PathBuf,

    /// Always run offline, regardless of credentials
    pub offline: bool,

    /// Whether the delete reconciliation pass is enabled
    pub deletes_enabled: bool,

    /// Mutable fields compared for change detection
    pub comparable_fields: Vec<String>,

    /// Timestamp-like fields tried (in order) by the cutoff filter
    pub timestamp_fields: Vec<String>,

    /// Marketplace credentials; placeholders force offline mode
    pub credentials: Option<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            offline: false,
            deletes_enabled: true,
            comparable_fields: crate::stores::default_comparable_fields(),
            timestamp_fields: crate::filter::default_timestamp_fields(),
            credentials: None,
        }
    }
}

/// Marketplace API credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    /// Whether all values are present and none look like placeholders
    pub fn is_configured(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.refresh_token]
            .iter()
            .all(|v| {
                let v = v.trim();
                !v.is_empty()
                    && !PLACEHOLDER_PREFIXES
                        .iter()
                        .any(|p| v.to_uppercase().starts_with(p))
            })
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the default config; a malformed file is a
    /// `Config` error.
    pub fn load(path: &Path) -> SkuSyncResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| SkuSyncError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Effective offline mode: an explicit flag, or credentials that are
    /// declared but not actually usable.
    ///
    /// No `[credentials]` section at all means the configured adapters
    /// need none (file-backed stores), so the run stays online.
    pub fn effective_offline(&self, override_offline: bool) -> bool {
        if override_offline || self.offline {
            return true;
        }
        match &self.credentials {
            Some(creds) => !creds.is_configured(),
            None => false,
        }
    }
}
