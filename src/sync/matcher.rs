//! Matcher - pairs local items to remote items by key
//!
//! Matching is exact string equality on the key. Pairing order is
//! load-bearing for reproducible run summaries: local iteration order
//! first (matched + local-only), then remote-only pairings in remote
//! iteration order.

use std::collections::{HashMap, HashSet};

use crate::models::{Item, Pairing};

/// Deduplicate a collection by key, keeping the first occurrence.
///
/// Duplicates are a data-quality problem, not a fatal one - each dropped
/// occurrence is logged as a warning.
fn dedupe(items: Vec<Item>, collection: &str) -> Vec<Item> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.key.clone()) {
            unique.push(item);
        } else {
            tracing::warn!(key = %item.key, collection, "duplicate key, keeping first occurrence");
        }
    }
    unique
}

/// Produce the complete set of pairings for the two collections.
///
/// Every local key and every remote key appears in exactly one pairing.
/// Items with empty keys must have been separated out by the caller.
pub fn pair_items(local: Vec<Item>, remote: Vec<Item>) -> Vec<Pairing> {
    let local = dedupe(local, "local");
    let remote = dedupe(remote, "remote");

    let mut remote_by_key: HashMap<String, Item> = remote
        .iter()
        .map(|item| (item.key.clone(), item.clone()))
        .collect();

    let mut pairings = Vec::with_capacity(local.len() + remote.len());
    for item in local {
        match remote_by_key.remove(&item.key) {
            Some(remote_item) => pairings.push(Pairing::matched(item, remote_item)),
            None => pairings.push(Pairing::local_only(item)),
        }
    }

    // Remote-only leftovers, in remote iteration order
    for item in remote {
        if remote_by_key.remove(&item.key).is_some() {
            pairings.push(Pairing::remote_only(item));
        }
    }

    pairings
}
