//! Core data models for skusync
//!
//! Defines the fundamental data structures used throughout skusync:
//! - `Item`: a normalized listing (local or remote), keyed by a stable id
//! - `Pairing`: a local item matched against its remote counterpart
//! - `Decision`: the planned action for one pairing
//! - `Outcome`: the result of executing one decision

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields tried, in priority order, when resolving the stable key of a
/// raw record (SKU or marketplace item id).
pub const KEY_FIELDS: [&str; 4] = ["id", "sku", "itemId", "item_id"];

/// One listing, local or remote.
///
/// The key is the stable identity used for matching; all other fields are
/// carried as-is and only interpreted by the timestamp filter and the
/// remote store's change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity (SKU or marketplace item id)
    pub key: String,

    /// All other fields of the record (price, status, timestamps, ...)
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Item {
    /// Create an item with the given key and no extra fields
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter, mostly for tests and fixtures
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether this item carries a usable key
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Build an item from a raw record, resolving the key from the first
    /// non-empty candidate field (`id`, `sku`, `itemId`, `item_id`).
    ///
    /// Records with no resolvable key still become items (with an empty
    /// key) so the engine can surface them instead of dropping them.
    pub fn from_record(record: BTreeMap<String, Value>) -> Self {
        let key = KEY_FIELDS
            .iter()
            .find_map(|name| record.get(*name).and_then(value_as_key))
            .unwrap_or_default();
        Self {
            key,
            fields: record,
        }
    }
}

/// Stringify a key candidate; null and empty strings do not count.
fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Action decided for one pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create the item remotely (local-only pairing)
    Add,
    /// Update the remote item (matched pairing, changed)
    Update,
    /// No remote call (unchanged, or gated by run mode)
    Skip,
    /// Remove the remote item (remote-only pairing)
    Delete,
}

impl Action {
    /// Whether this action mutates remote state
    pub fn is_mutating(self) -> bool {
        !matches!(self, Action::Skip)
    }

    /// Verb form used in "would <verb>" details for gated decisions
    pub fn verb(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Skip => "skip",
            Action::Delete => "delete",
        }
    }
}

/// One local key matched against one remote key.
///
/// Exactly one of three shapes: both present (matched), local only, or
/// remote only. Pairings are transient - produced and consumed within a
/// single reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub key: String,
    pub local: Option<Item>,
    pub remote: Option<Item>,
}

impl Pairing {
    pub fn matched(local: Item, remote: Item) -> Self {
        Self {
            key: local.key.clone(),
            local: Some(local),
            remote: Some(remote),
        }
    }

    pub fn local_only(local: Item) -> Self {
        Self {
            key: local.key.clone(),
            local: Some(local),
            remote: None,
        }
    }

    pub fn remote_only(remote: Item) -> Self {
        Self {
            key: remote.key.clone(),
            local: None,
            remote: Some(remote),
        }
    }
}

/// The planned action for one pairing, immutable once produced.
///
/// `intended` keeps the classification result even after gating downgrades
/// `action` to `Skip`, so reports can show what would have happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub key: String,
    /// Action after gating - the one the executor dispatches on
    pub action: Action,
    /// Action from classification, before any gating
    pub intended: Action,
    /// Short reason code ("remote_missing", "offline", ...)
    pub reason: &'static str,
    pub local: Option<Item>,
    pub remote: Option<Item>,
}

impl Decision {
    /// Whether gating downgraded this decision
    pub fn is_gated(&self) -> bool {
        self.action != self.intended
    }
}

/// Result classification of one executed decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeResult {
    Succeeded,
    Skipped,
    Failed,
}

/// The result of executing one decision - exactly one per decision, in
/// decision order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub key: String,
    /// Action as it actually resolved (an upsert that found nothing to
    /// change resolves to `Skip` here, whatever was planned)
    pub action: Action,
    pub result: OutcomeResult,
    /// Reason code, plus "would <action>" for gated decisions
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn succeeded(key: impl Into<String>, action: Action, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action,
            result: OutcomeResult::Succeeded,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn skipped(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: Action::Skip,
            result: OutcomeResult::Skipped,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn failed(
        key: impl Into<String>,
        action: Action,
        detail: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            action,
            result: OutcomeResult::Failed,
            detail: detail.into(),
            error: Some(error.into()),
        }
    }
}
