//! Run orchestration - one reconciliation pass, start to summary
//!
//! Control flow: load local -> timestamp filter -> match -> decide ->
//! execute -> summarize. A local-load failure is the only fatal path; a
//! remote-load failure degrades the run to offline behavior and still
//! produces a summary. The engine holds no state between invocations.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;

use chrono::Utc;

use crate::error::SkuSyncResult;
use crate::filter;
use crate::models::{Item, Outcome};
use crate::report::RunSummary;
use crate::stores::{LocalStore, RemoteStore};
use crate::sync::{pair_items, plan_decisions, execute_decisions, SyncEvent, SyncOptions};

/// Run one full reconciliation pass.
///
/// Errors only on local-load failure; every other failure mode is
/// reflected in the returned summary.
pub fn run_sync(
    local: &dyn LocalStore,
    remote: &mut dyn RemoteStore,
    options: &SyncOptions,
) -> SkuSyncResult<RunSummary> {
    run_sync_with_callback::<fn(SyncEvent)>(local, remote, options, None, None)
}

/// Run one full reconciliation pass with progress events and cooperative
/// cancellation.
pub fn run_sync_with_callback<F>(
    local: &dyn LocalStore,
    remote: &mut dyn RemoteStore,
    options: &SyncOptions,
    cancel: Option<&AtomicBool>,
    callback: Option<F>,
) -> SkuSyncResult<RunSummary>
where
    F: FnMut(SyncEvent),
{
    let started_at = Utc::now();

    // Local-load failures abort before any decisions are made; this is
    // distinct from a valid empty collection.
    let local_items = local.items()?;

    // Records without a resolvable key are surfaced, never silently dropped.
    let (keyed, keyless): (Vec<Item>, Vec<Item>) =
        local_items.into_iter().partition(Item::has_key);
    let mut outcomes: Vec<Outcome> = keyless
        .iter()
        .map(|_| Outcome::skipped("(unknown)", "no_key"))
        .collect();
    if !keyless.is_empty() {
        tracing::warn!(count = keyless.len(), "local records without a usable key");
    }

    // Remote fetch: skipped entirely when offline; a fetch failure
    // downgrades this run to offline behavior instead of aborting it.
    let mut effective = options.clone();
    let remote_items = if effective.offline {
        Vec::new()
    } else {
        match remote.items() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "remote fetch failed, degrading run to offline");
                effective.offline = true;
                Vec::new()
            }
        }
    };

    let ts_fields = if effective.timestamp_fields.is_empty() {
        filter::default_timestamp_fields()
    } else {
        effective.timestamp_fields.clone()
    };
    let filtered = filter::filter_since(keyed, effective.since, &ts_fields);

    let pairings = pair_items(filtered, remote_items);
    let decisions = plan_decisions(pairings, &effective);
    outcomes.extend(execute_decisions(
        decisions, remote, &effective, cancel, callback,
    ));

    let ended_at = Utc::now();
    let mut adapters = BTreeMap::new();
    adapters.insert("local".to_string(), local.name().to_string());
    adapters.insert("remote".to_string(), remote.name().to_string());

    let summary = RunSummary::new(started_at, ended_at, outcomes, adapters);
    tracing::info!(
        added = summary.counts.added,
        updated = summary.counts.updated,
        skipped = summary.counts.skipped,
        deleted = summary.counts.deleted,
        errors = summary.counts.errors,
        "sync run complete"
    );
    Ok(summary)
}
