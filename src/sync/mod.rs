//! Reconciliation and sync-run engine
//!
//! Single sequential pass: filter -> match -> decide -> execute -> report.
//! No component is re-entered, nothing runs in parallel, and outcome
//! ordering exactly mirrors decision ordering so run summaries are
//! reproducible.

pub mod engine;
pub mod execute;
pub mod matcher;
pub mod plan;

use chrono::{DateTime, Utc};

use crate::models::Action;

pub use engine::{run_sync, run_sync_with_callback};
pub use execute::execute_decisions;
pub use matcher::pair_items;
pub use plan::{classify, gate, plan_decisions};

/// Options for one sync run.
///
/// All mode flags are explicit inputs; the engine never reads the
/// environment or resolves credentials itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// No remote mutation is ever attempted; remote inventory is treated
    /// as empty
    pub offline: bool,
    /// Decisions are computed and reported but never executed
    pub dry_run: bool,
    /// Whether remote-only items may be deleted
    pub deletes_enabled: bool,
    /// Only process local items changed on/after this instant (inclusive)
    pub since: Option<DateTime<Utc>>,
    /// Timestamp-like fields tried by the cutoff filter; empty means the
    /// built-in default list
    pub timestamp_fields: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            offline: false,
            dry_run: false,
            deletes_enabled: true,
            since: None,
            timestamp_fields: Vec::new(),
        }
    }
}

/// Progress event emitted while executing decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    ItemStart {
        index: usize,
        key: String,
    },
    ItemDone {
        index: usize,
        key: String,
        action: Action,
    },
    ItemError {
        index: usize,
        key: String,
        message: String,
    },
}
