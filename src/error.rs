//! Error types for skusync
//!
//! Uses `thiserror` for library errors. The taxonomy mirrors the engine's
//! failure model: `Source` is the only fatal variant for a sync run,
//! `Remote` degrades the run to offline behavior, and `Item` is captured
//! per-item by the executor.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for skusync operations
pub type SkuSyncResult<T> = Result<T, SkuSyncError>;

/// Main error type for skusync operations
#[derive(Error, Debug)]
pub enum SkuSyncError {
    /// Local store unreachable or malformed - fatal, no summary is produced
    #[error("local source '{store}' failed: {message}")]
    Source { store: String, message: String },

    /// Remote fetch/transport failure - the run degrades to offline behavior
    #[error("remote '{store}' failed: {message}")]
    Remote { store: String, message: String },

    /// A single item's remote operation failed - captured per-item, non-fatal
    #[error("item '{key}' failed: {message}")]
    Item { key: String, message: String },

    /// Invalid configuration value
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
