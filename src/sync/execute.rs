//! Executor - applies decisions through the remote store
//!
//! Single-attempt-per-decision dispatcher: decisions are executed
//! sequentially in decision order, with no batching, no reordering and no
//! retry (the remote store owns any retry policy internally). A failing
//! collaborator call produces a failed outcome for that item and never
//! aborts the run.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::{Action, Decision, Outcome};
use crate::stores::{DeleteOutcome, RemoteStore, UpsertOutcome};
use crate::sync::{SyncEvent, SyncOptions};

/// Execute the ordered decision sequence, producing one outcome per
/// decision.
///
/// `cancel` is checked between decisions; when tripped the remaining
/// decisions are left unexecuted and the outcomes produced so far are
/// returned, so the caller still gets a coherent (partial) summary.
pub fn execute_decisions<F>(
    decisions: Vec<Decision>,
    remote: &mut dyn RemoteStore,
    options: &SyncOptions,
    cancel: Option<&AtomicBool>,
    mut callback: Option<F>,
) -> Vec<Outcome>
where
    F: FnMut(SyncEvent),
{
    let mut outcomes = Vec::with_capacity(decisions.len());

    for (index, decision) in decisions.into_iter().enumerate() {
        if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            tracing::warn!(
                executed = outcomes.len(),
                "run cancelled, remaining decisions not executed"
            );
            break;
        }

        if let Some(ref mut cb) = callback {
            cb(SyncEvent::ItemStart {
                index,
                key: decision.key.clone(),
            });
        }

        let outcome = execute_one(decision, remote, options);

        if let Some(ref mut cb) = callback {
            match &outcome.error {
                Some(message) => cb(SyncEvent::ItemError {
                    index,
                    key: outcome.key.clone(),
                    message: message.clone(),
                }),
                None => cb(SyncEvent::ItemDone {
                    index,
                    key: outcome.key.clone(),
                    action: outcome.action,
                }),
            }
        }

        outcomes.push(outcome);
    }

    outcomes
}

fn execute_one(
    decision: Decision,
    remote: &mut dyn RemoteStore,
    options: &SyncOptions,
) -> Outcome {
    // Gated decisions record a skip without any collaborator call; the
    // intended action stays visible in the detail.
    if decision.action == Action::Skip {
        let detail = if decision.is_gated() {
            format!("{} (would {})", decision.reason, decision.intended.verb())
        } else {
            decision.reason.to_string()
        };
        return Outcome::skipped(decision.key, detail);
    }

    // Dry run: classification preserved for reporting, zero mutations.
    if options.dry_run {
        let detail = format!("dry_run (would {})", decision.action.verb());
        return Outcome::skipped(decision.key, detail);
    }

    match decision.action {
        Action::Add | Action::Update => {
            let Some(local) = decision.local.as_ref() else {
                return Outcome::failed(
                    decision.key,
                    decision.action,
                    decision.reason,
                    "decision has no local item",
                );
            };
            match remote.upsert(local, decision.remote.as_ref()) {
                Ok(UpsertOutcome::Added) => {
                    Outcome::succeeded(decision.key, Action::Add, "upsert")
                }
                Ok(UpsertOutcome::Updated) => {
                    Outcome::succeeded(decision.key, Action::Update, "upsert")
                }
                Ok(UpsertOutcome::Skipped) => Outcome::skipped(decision.key, "no_change"),
                Err(e) => {
                    tracing::warn!(key = %decision.key, error = %e, "upsert failed");
                    Outcome::failed(decision.key, decision.action, "upsert", e.to_string())
                }
            }
        }
        Action::Delete => {
            let Some(remote_item) = decision.remote.as_ref() else {
                return Outcome::failed(
                    decision.key,
                    decision.action,
                    decision.reason,
                    "decision has no remote item",
                );
            };
            match remote.delete(remote_item) {
                Ok(DeleteOutcome::Deleted) => {
                    Outcome::succeeded(decision.key, Action::Delete, "reconcile_delete")
                }
                Ok(DeleteOutcome::Skipped) => {
                    Outcome::skipped(decision.key, "reconcile_delete")
                }
                Err(e) => {
                    tracing::warn!(key = %decision.key, error = %e, "delete failed");
                    Outcome::failed(decision.key, Action::Delete, "reconcile_delete", e.to_string())
                }
            }
        }
        Action::Skip => unreachable!("skip handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SkuSyncError, SkuSyncResult};
    use crate::models::{Item, OutcomeResult, Pairing};
    use crate::stores::MemoryRemoteStore;
    use crate::sync::plan_decisions;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;

    /// Remote store that fails upserts for chosen keys
    struct FlakyRemote {
        inner: MemoryRemoteStore,
        fail_keys: HashSet<String>,
    }

    impl FlakyRemote {
        fn failing_on(keys: &[&str]) -> Self {
            Self {
                inner: MemoryRemoteStore::new(),
                fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            }
        }
    }

    impl RemoteStore for FlakyRemote {
        fn name(&self) -> &str {
            "flaky"
        }

        fn items(&self) -> SkuSyncResult<Vec<Item>> {
            self.inner.items()
        }

        fn upsert(
            &mut self,
            local: &Item,
            remote: Option<&Item>,
        ) -> SkuSyncResult<UpsertOutcome> {
            if self.fail_keys.contains(&local.key) {
                return Err(SkuSyncError::Item {
                    key: local.key.clone(),
                    message: "injected failure".to_string(),
                });
            }
            self.inner.upsert(local, remote)
        }

        fn delete(&mut self, remote: &Item) -> SkuSyncResult<DeleteOutcome> {
            self.inner.delete(remote)
        }
    }

    fn priced(key: &str, price: f64) -> Item {
        Item::new(key).with_field("price", json!(price))
    }

    fn no_callback() -> Option<fn(SyncEvent)> {
        None
    }

    #[test]
    fn add_and_delete_dispatch_to_store() {
        let options = SyncOptions::default();
        let remote_item = priced("gone", 1.0);
        let mut store = MemoryRemoteStore::with_items(vec![remote_item.clone()]);

        let pairings = vec![
            Pairing::local_only(priced("new", 2.0)),
            Pairing::remote_only(remote_item),
        ];
        let decisions = plan_decisions(pairings, &options);

        let outcomes = execute_decisions(decisions, &mut store, &options, None, no_callback());

        assert_eq!(outcomes[0].action, Action::Add);
        assert_eq!(outcomes[0].result, OutcomeResult::Succeeded);
        assert_eq!(outcomes[1].action, Action::Delete);
        assert!(store.get("new").is_some());
        assert!(store.get("gone").is_none());
    }

    #[test]
    fn unchanged_upsert_resolves_to_no_change_skip() {
        let options = SyncOptions::default();
        let item = priced("same", 3.0);
        let mut store = MemoryRemoteStore::with_items(vec![item.clone()]);

        let decisions =
            plan_decisions(vec![Pairing::matched(item.clone(), item)], &options);
        let outcomes = execute_decisions(decisions, &mut store, &options, None, no_callback());

        assert_eq!(outcomes[0].action, Action::Skip);
        assert_eq!(outcomes[0].result, OutcomeResult::Skipped);
        assert_eq!(outcomes[0].detail, "no_change");
    }

    #[test]
    fn one_failure_does_not_abort_the_run() {
        let options = SyncOptions::default();
        let mut store = FlakyRemote::failing_on(&["b"]);

        let pairings = vec![
            Pairing::local_only(priced("a", 1.0)),
            Pairing::local_only(priced("b", 2.0)),
            Pairing::local_only(priced("c", 3.0)),
        ];
        let decisions = plan_decisions(pairings, &options);
        let outcomes = execute_decisions(decisions, &mut store, &options, None, no_callback());

        // Outcomes exist for all three items, not just the first two
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].result, OutcomeResult::Succeeded);
        assert_eq!(outcomes[1].result, OutcomeResult::Failed);
        assert!(outcomes[1].error.as_deref().unwrap().contains("injected failure"));
        assert_eq!(outcomes[2].result, OutcomeResult::Succeeded);
    }

    #[test]
    fn offline_decisions_issue_zero_collaborator_calls() {
        let options = SyncOptions {
            offline: true,
            ..SyncOptions::default()
        };
        let mut store = MemoryRemoteStore::new();

        let pairings = vec![
            Pairing::local_only(priced("a", 1.0)),
            Pairing::remote_only(priced("r", 2.0)),
        ];
        let decisions = plan_decisions(pairings, &options);
        let outcomes = execute_decisions(decisions, &mut store, &options, None, no_callback());

        assert_eq!(store.mutation_calls(), 0);
        assert!(outcomes
            .iter()
            .all(|o| o.result == OutcomeResult::Skipped && o.error.is_none()));
        assert_eq!(outcomes[0].detail, "offline (would add)");
        assert_eq!(outcomes[1].detail, "offline (would delete)");
    }

    #[test]
    fn dry_run_skips_with_intended_action_in_detail() {
        let options = SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        };
        let mut store = MemoryRemoteStore::new();

        let decisions = plan_decisions(
            vec![Pairing::local_only(priced("a", 1.0))],
            &options,
        );
        let outcomes = execute_decisions(decisions, &mut store, &options, None, no_callback());

        assert_eq!(store.mutation_calls(), 0);
        assert_eq!(outcomes[0].detail, "dry_run (would add)");
    }

    #[test]
    fn cancel_between_decisions_yields_partial_outcomes() {
        let options = SyncOptions::default();
        let mut store = MemoryRemoteStore::new();
        let cancel = AtomicBool::new(false);

        let pairings = vec![
            Pairing::local_only(priced("a", 1.0)),
            Pairing::local_only(priced("b", 2.0)),
            Pairing::local_only(priced("c", 3.0)),
        ];
        let decisions = plan_decisions(pairings, &options);

        // Trip the flag after the first item completes
        let mut seen = 0;
        let outcomes = execute_decisions(
            decisions,
            &mut store,
            &options,
            Some(&cancel),
            Some(|event: SyncEvent| {
                if matches!(event, SyncEvent::ItemDone { .. }) {
                    seen += 1;
                    if seen == 1 {
                        cancel.store(true, Ordering::SeqCst);
                    }
                }
            }),
        );

        assert_eq!(outcomes.len(), 1);
        assert_eq!(store.mutation_calls(), 1);
    }

    #[test]
    fn events_mirror_outcomes() {
        let options = SyncOptions::default();
        let mut store = FlakyRemote::failing_on(&["bad"]);

        let pairings = vec![
            Pairing::local_only(priced("ok", 1.0)),
            Pairing::local_only(priced("bad", 2.0)),
        ];
        let decisions = plan_decisions(pairings, &options);

        let mut events = Vec::new();
        execute_decisions(
            decisions,
            &mut store,
            &options,
            None,
            Some(|e: SyncEvent| events.push(e)),
        );

        // 2 starts + 1 done + 1 error
        assert_eq!(events.len(), 4);
        assert!(matches!(events[1], SyncEvent::ItemDone { .. }));
        assert!(matches!(events[3], SyncEvent::ItemError { .. }));
    }
}
