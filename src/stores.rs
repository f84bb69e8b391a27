//! Local/remote store ports and shipped adapters
//!
//! The engine consumes these traits and never branches on adapter kind;
//! concrete stores are selected once at process start and injected as
//! plain trait objects.
//!
//! Shipped adapters:
//! - `JsonFileLocalStore`: reads a JSON array of records
//! - `JsonFileRemoteStore`: JSON snapshot file, rewritten atomically on
//!   every mutation
//! - `MemoryLocalStore` / `MemoryRemoteStore`: in-memory stores for tests
//!   and embedding

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{SkuSyncError, SkuSyncResult};
use crate::models::Item;

/// Mutable-field subset compared for change detection when nothing is
/// configured. Volatile fields (view counters etc.) are deliberately
/// absent so passive metric drift never counts as a change.
pub const DEFAULT_COMPARABLE_FIELDS: [&str; 4] = ["price", "quantity", "status", "title"];

/// Default comparable field list as owned strings (config default)
pub fn default_comparable_fields() -> Vec<String> {
    DEFAULT_COMPARABLE_FIELDS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Result label of an upsert call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Added,
    Updated,
    Skipped,
}

/// Result label of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOutcome {
    Deleted,
    Skipped,
}

/// Source of local listings
pub trait LocalStore {
    /// Adapter identifier recorded in run summaries
    fn name(&self) -> &str;

    /// Load the full local collection.
    ///
    /// Must fail with `SkuSyncError::Source` rather than silently return
    /// partial data.
    fn items(&self) -> SkuSyncResult<Vec<Item>>;
}

/// Remote marketplace operations
pub trait RemoteStore {
    /// Adapter identifier recorded in run summaries
    fn name(&self) -> &str;

    /// Fetch the remote inventory snapshot.
    fn items(&self) -> SkuSyncResult<Vec<Item>>;

    /// Create or update one remote item.
    ///
    /// Owns the "unchanged" equality policy: a matched pair with no
    /// meaningful difference yields `Skipped`. Must be idempotent -
    /// calling twice with identical inputs yields the same label and no
    /// duplicate remote state.
    fn upsert(&mut self, local: &Item, remote: Option<&Item>) -> SkuSyncResult<UpsertOutcome>;

    /// Delete one remote item.
    fn delete(&mut self, remote: &Item) -> SkuSyncResult<DeleteOutcome>;
}

/// SHA-256 fingerprint over the comparable-field subset of an item.
///
/// Canonical by construction: fields live in a `BTreeMap`, so the JSON
/// serialization is key-ordered.
pub fn comparable_fingerprint(item: &Item, comparable: &[String]) -> String {
    let subset: BTreeMap<&str, &Value> = comparable
        .iter()
        .filter_map(|name| item.field(name).map(|v| (name.as_str(), v)))
        .collect();
    let canonical = serde_json::to_string(&subset).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Whether a matched pair is unchanged under the comparable-field policy
pub fn is_unchanged(local: &Item, remote: &Item, comparable: &[String]) -> bool {
    comparable_fingerprint(local, comparable) == comparable_fingerprint(remote, comparable)
}

// ============================================================================
// JSON file adapters
// ============================================================================

/// Local store backed by a JSON array of records
#[derive(Debug, Clone)]
pub struct JsonFileLocalStore {
    path: PathBuf,
}

impl JsonFileLocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn source_error(&self, message: impl Into<String>) -> SkuSyncError {
        SkuSyncError::Source {
            store: format!("json-file:{}", self.path.display()),
            message: message.into(),
        }
    }
}

impl LocalStore for JsonFileLocalStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn items(&self) -> SkuSyncResult<Vec<Item>> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| self.source_error(e.to_string()))?;
        let records: Vec<BTreeMap<String, Value>> = serde_json::from_str(&raw)
            .map_err(|e| self.source_error(format!("not a JSON array of records: {e}")))?;
        Ok(records.into_iter().map(Item::from_record).collect())
    }
}

/// Remote store backed by a JSON snapshot file.
///
/// The snapshot is a JSON array of records, rewritten atomically on every
/// mutation. A missing file is an empty remote inventory.
#[derive(Debug, Clone)]
pub struct JsonFileRemoteStore {
    path: PathBuf,
    comparable: Vec<String>,
}

impl JsonFileRemoteStore {
    pub fn new(path: impl Into<PathBuf>, comparable: Vec<String>) -> Self {
        Self {
            path: path.into(),
            comparable,
        }
    }

    fn remote_error(&self, message: impl Into<String>) -> SkuSyncError {
        SkuSyncError::Remote {
            store: format!("json-file:{}", self.path.display()),
            message: message.into(),
        }
    }

    fn load(&self) -> SkuSyncResult<Vec<Item>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| self.remote_error(e.to_string()))?;
        let records: Vec<BTreeMap<String, Value>> = serde_json::from_str(&raw)
            .map_err(|e| self.remote_error(format!("corrupt snapshot: {e}")))?;
        Ok(records.into_iter().map(Item::from_record).collect())
    }

    fn save(&self, items: &[Item]) -> SkuSyncResult<()> {
        // Records must survive a reload keyed by the same identity, even
        // for items constructed without an explicit id field.
        let records: Vec<BTreeMap<String, Value>> = items
            .iter()
            .map(|i| {
                let mut fields = i.fields.clone();
                if !crate::models::KEY_FIELDS.iter().any(|k| fields.contains_key(*k)) {
                    fields.insert("id".to_string(), Value::String(i.key.clone()));
                }
                fields
            })
            .collect();
        let body = serde_json::to_string_pretty(&records)?;
        crate::report::atomic_write(&self.path, &body)
            .map_err(|e| self.remote_error(e.to_string()))
    }
}

impl RemoteStore for JsonFileRemoteStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn items(&self) -> SkuSyncResult<Vec<Item>> {
        self.load()
    }

    fn upsert(&mut self, local: &Item, remote: Option<&Item>) -> SkuSyncResult<UpsertOutcome> {
        if let Some(remote) = remote {
            if is_unchanged(local, remote, &self.comparable) {
                return Ok(UpsertOutcome::Skipped);
            }
        }

        let mut items = self.load()?;
        let existed = if let Some(slot) = items.iter_mut().find(|i| i.key == local.key) {
            *slot = local.clone();
            true
        } else {
            items.push(local.clone());
            false
        };
        self.save(&items)?;

        if existed || remote.is_some() {
            Ok(UpsertOutcome::Updated)
        } else {
            Ok(UpsertOutcome::Added)
        }
    }

    fn delete(&mut self, remote: &Item) -> SkuSyncResult<DeleteOutcome> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|i| i.key != remote.key);
        if items.len() == before {
            return Ok(DeleteOutcome::Skipped);
        }
        self.save(&items)?;
        Ok(DeleteOutcome::Deleted)
    }
}

// ============================================================================
// In-memory adapters
// ============================================================================

/// In-memory local store
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStore {
    pub items: Vec<Item>,
}

impl MemoryLocalStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl LocalStore for MemoryLocalStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn items(&self) -> SkuSyncResult<Vec<Item>> {
        Ok(self.items.clone())
    }
}

/// In-memory remote store with call counters.
///
/// The counters let tests assert the "offline issues zero collaborator
/// calls" property without instrumenting the engine.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    items: BTreeMap<String, Item>,
    /// Insertion order of keys, so `items()` is deterministic
    order: Vec<String>,
    comparable: Vec<String>,
    pub upsert_calls: usize,
    pub delete_calls: usize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            comparable: default_comparable_fields(),
            ..Self::default()
        }
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    fn insert(&mut self, item: Item) {
        if !self.items.contains_key(&item.key) {
            self.order.push(item.key.clone());
        }
        self.items.insert(item.key.clone(), item);
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn mutation_calls(&self) -> usize {
        self.upsert_calls + self.delete_calls
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn items(&self) -> SkuSyncResult<Vec<Item>> {
        Ok(self
            .order
            .iter()
            .filter_map(|k| self.items.get(k).cloned())
            .collect())
    }

    fn upsert(&mut self, local: &Item, remote: Option<&Item>) -> SkuSyncResult<UpsertOutcome> {
        self.upsert_calls += 1;
        if let Some(remote) = remote {
            if is_unchanged(local, remote, &self.comparable) {
                return Ok(UpsertOutcome::Skipped);
            }
        }
        let existed = self.items.contains_key(&local.key);
        self.insert(local.clone());
        if existed || remote.is_some() {
            Ok(UpsertOutcome::Updated)
        } else {
            Ok(UpsertOutcome::Added)
        }
    }

    fn delete(&mut self, remote: &Item) -> SkuSyncResult<DeleteOutcome> {
        self.delete_calls += 1;
        if self.items.remove(&remote.key).is_none() {
            return Ok(DeleteOutcome::Skipped);
        }
        self.order.retain(|k| k != &remote.key);
        Ok(DeleteOutcome::Deleted)
    }
}
