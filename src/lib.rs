//! Skusync - marketplace inventory reconciliation and sync runner
//!
//! Skusync reconciles a locally held inventory of marketplace listings
//! against a remote marketplace snapshot, producing a minimal set of
//! mutating operations (add/update/skip/delete) and a durable,
//! deterministic summary of each run.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod stores;
pub mod sync;

// Re-exports for convenience
pub use config::{Config, Credentials};
pub use error::{SkuSyncError, SkuSyncResult};
pub use models::{Action, Decision, Item, Outcome, OutcomeResult, Pairing};
pub use report::{rollup_line, write_artifacts, write_summary_csv, Counts, RunSummary};
pub use stores::{
    DeleteOutcome, JsonFileLocalStore, JsonFileRemoteStore, LocalStore, MemoryLocalStore,
    MemoryRemoteStore, RemoteStore, UpsertOutcome,
};
pub use sync::{run_sync, run_sync_with_callback, SyncEvent, SyncOptions};
