//! Run summary and artifact writing
//!
//! Turns the ordered outcome sequence of one run into:
//! - a detailed JSON artifact, one timestamped file per run
//! - a compact one-line rollup appended to a persistent rolling log
//! - optionally, a one-row CSV export of the same counts
//!
//! Counts in every form are a pure projection of the outcome sequence, so
//! the rollup and the artifact can never disagree.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SkuSyncResult;
use crate::models::{Action, Outcome, OutcomeResult};

/// Aggregate counters for one run.
///
/// Field declaration order is the serialization order and is load-bearing
/// for artifact stability - do not reorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
    pub deleted: u64,
    pub errors: u64,
}

impl Counts {
    /// Project counts from an outcome sequence.
    ///
    /// Pure: re-running over the same sequence always yields the same
    /// counts. `errors` equals the number of failed outcomes, always.
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match (outcome.result, outcome.action) {
                (OutcomeResult::Failed, _) => counts.errors += 1,
                (OutcomeResult::Skipped, _) => counts.skipped += 1,
                (OutcomeResult::Succeeded, Action::Add) => counts.added += 1,
                (OutcomeResult::Succeeded, Action::Update) => counts.updated += 1,
                (OutcomeResult::Succeeded, Action::Delete) => counts.deleted += 1,
                (OutcomeResult::Succeeded, Action::Skip) => counts.skipped += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u64 {
        self.added + self.updated + self.skipped + self.deleted + self.errors
    }
}

/// Aggregate over all outcomes of one run invocation.
///
/// Created at run start, mutated only during the single pass, frozen once
/// serialized.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Whole seconds, never negative
    pub duration_sec: i64,
    pub counts: Counts,
    pub items: Vec<Outcome>,
    /// Role -> adapter identifier ("local" -> "json-file", ...)
    pub adapters: BTreeMap<String, String>,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        items: Vec<Outcome>,
        adapters: BTreeMap<String, String>,
    ) -> Self {
        let counts = Counts::from_outcomes(&items);
        let duration_sec = (ended_at - started_at).num_seconds().max(0);
        Self {
            started_at,
            ended_at,
            duration_sec,
            counts,
            items,
            adapters,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    /// Timestamp used in artifact file names and the rollup line
    pub fn stamp(&self) -> String {
        self.ended_at.format("%Y%m%d-%H%M%S").to_string()
    }
}

/// Format the one-line rollup for a run.
///
/// Byte-identical for identical counts/duration/stamp.
pub fn rollup_line(stamp: &str, counts: &Counts, duration_sec: i64) -> String {
    format!(
        "{stamp} | added={} updated={} skipped={} deleted={} errors={} duration_sec={}",
        counts.added, counts.updated, counts.skipped, counts.deleted, counts.errors, duration_sec
    )
}

/// Write content to a file atomically (tempfile + rename).
pub fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)?;
    }
    let dir = parent.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write the per-run artifacts: the detailed JSON document and the rollup
/// line appended to `sync.log`. Returns the artifact path.
pub fn write_artifacts(summary: &RunSummary, log_dir: &Path) -> SkuSyncResult<PathBuf> {
    std::fs::create_dir_all(log_dir)?;

    let stamp = summary.stamp();
    let json_path = log_dir.join(format!("sync-{stamp}.json"));
    let body = serde_json::to_string_pretty(summary)?;
    atomic_write(&json_path, &body)?;

    let line = rollup_line(&stamp, &summary.counts, summary.duration_sec);
    let mut log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("sync.log"))?;
    writeln!(log, "{line}")?;

    Ok(json_path)
}

/// Write a one-row CSV rollup for spreadsheet consumption.
pub fn write_summary_csv(summary: &RunSummary, path: &Path) -> SkuSyncResult<()> {
    let c = &summary.counts;
    let body = format!(
        "started_at,ended_at,duration_sec,added,updated,skipped,deleted,errors\n\
         {},{},{},{},{},{},{},{}\n",
        summary.started_at.to_rfc3339(),
        summary.ended_at.to_rfc3339(),
        summary.duration_sec,
        c.added,
        c.updated,
        c.skipped,
        c.deleted,
        c.errors,
    );
    atomic_write(path, &body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn summary_with(outcomes: Vec<Outcome>) -> RunSummary {
        let started = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        let ended = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 3).unwrap();
        let mut adapters = BTreeMap::new();
        adapters.insert("local".to_string(), "memory".to_string());
        adapters.insert("remote".to_string(), "memory".to_string());
        RunSummary::new(started, ended, outcomes, adapters)
    }

    #[test]
    fn counts_project_from_outcomes() {
        let outcomes = vec![
            Outcome::succeeded("a", Action::Add, "upsert"),
            Outcome::succeeded("b", Action::Update, "upsert"),
            Outcome::skipped("c", "no_change"),
            Outcome::succeeded("d", Action::Delete, "reconcile_delete"),
            Outcome::failed("e", Action::Update, "upsert", "boom"),
        ];
        let counts = Counts::from_outcomes(&outcomes);
        assert_eq!(
            counts,
            Counts {
                added: 1,
                updated: 1,
                skipped: 1,
                deleted: 1,
                errors: 1,
            }
        );
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn errors_equal_failed_outcomes() {
        let outcomes = vec![
            Outcome::failed("a", Action::Add, "upsert", "x"),
            Outcome::failed("b", Action::Delete, "reconcile_delete", "y"),
        ];
        assert_eq!(Counts::from_outcomes(&outcomes).errors, 2);
    }

    #[test]
    fn rollup_line_is_stable() {
        let counts = Counts {
            added: 1,
            updated: 2,
            skipped: 3,
            deleted: 0,
            errors: 0,
        };
        let line = rollup_line("20251005-120003", &counts, 3);
        assert_eq!(
            line,
            "20251005-120003 | added=1 updated=2 skipped=3 deleted=0 errors=0 duration_sec=3"
        );
        // Re-serializing identical inputs is byte-identical
        assert_eq!(line, rollup_line("20251005-120003", &counts, 3));
    }

    #[test]
    fn duration_is_whole_seconds_non_negative() {
        let started = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 5).unwrap();
        let ended = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        let summary = RunSummary::new(started, ended, vec![], BTreeMap::new());
        assert_eq!(summary.duration_sec, 0);
    }

    #[test]
    fn artifact_has_stable_top_level_keys() {
        let summary = summary_with(vec![Outcome::succeeded("a", Action::Add, "upsert")]);
        let json = serde_json::to_string(&summary).unwrap();
        let started = json.find("started_at").unwrap();
        let counts = json.find("counts").unwrap();
        let items = json.find("\"items\"").unwrap();
        let adapters = json.find("adapters").unwrap();
        assert!(started < counts && counts < items && items < adapters);
    }

    #[test]
    fn write_artifacts_creates_json_and_appends_rollup() {
        let dir = tempdir().unwrap();
        let summary = summary_with(vec![Outcome::succeeded("a", Action::Add, "upsert")]);

        let path1 = write_artifacts(&summary, dir.path()).unwrap();
        assert!(path1.exists());
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path1).unwrap()).unwrap();
        assert_eq!(parsed["counts"]["added"], 1);
        assert_eq!(parsed["adapters"]["local"], "memory");
        assert_eq!(parsed["started_at"], "2025-10-05T12:00:00Z");

        // Rollup appends, never overwrites
        write_artifacts(&summary, dir.path()).unwrap();
        let log = std::fs::read_to_string(dir.path().join("sync.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.lines().all(|l| l.contains("added=1")));
    }

    #[test]
    fn summary_csv_is_one_header_one_row() {
        let dir = tempdir().unwrap();
        let summary = summary_with(vec![Outcome::skipped("a", "dry_run (would add)")]);
        let path = dir.path().join("out/summary.csv");

        write_summary_csv(&summary, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("started_at,ended_at,duration_sec"));
        assert!(lines[1].contains(",1,0,0")); // skipped=1, deleted=0, errors=0
    }
}
