//! Decision policy - classify each pairing, then gate by run mode
//!
//! The two phases are deliberately split so the run summary can report
//! what would have happened separately from what was allowed to happen:
//! classification records the intended action, gating only downgrades the
//! dispatched action to skip.

use crate::models::{Action, Decision, Pairing};
use crate::sync::SyncOptions;

/// Classify one pairing into a decision, first matching rule wins:
///
/// 1. remote only -> delete (`local_missing`)
/// 2. local only -> add (`remote_missing`)
/// 3./4. matched -> update (`changed`); whether the pair is actually
///    unchanged is delegated to the remote store's upsert, which resolves
///    such decisions to a `no_change` skip at execution time.
pub fn classify(pairing: Pairing) -> Decision {
    let Pairing { key, local, remote } = pairing;
    let (action, reason) = match (&local, &remote) {
        (None, Some(_)) => (Action::Delete, "local_missing"),
        (Some(_), None) => (Action::Add, "remote_missing"),
        (Some(_), Some(_)) => (Action::Update, "changed"),
        // Unreachable by construction; a keyless pairing decides nothing
        (None, None) => (Action::Skip, "empty_pairing"),
    };
    Decision {
        key,
        action,
        intended: action,
        reason,
        local,
        remote,
    }
}

/// Apply the global mode gates to a classified decision, in order:
///
/// 1. offline: every mutating action is downgraded to skip (`offline`)
/// 2. else dry-run: classification is preserved here; the executor
///    records the skip without calling any collaborator
/// 3. else delete while delete-reconciliation is disabled: downgraded to
///    skip (`deletes_disabled`)
pub fn gate(mut decision: Decision, options: &SyncOptions) -> Decision {
    if options.offline {
        if decision.action.is_mutating() {
            decision.action = Action::Skip;
            decision.reason = "offline";
        }
    } else if !options.dry_run
        && decision.action == Action::Delete
        && !options.deletes_enabled
    {
        decision.action = Action::Skip;
        decision.reason = "deletes_disabled";
    }
    decision
}

/// Classify and gate all pairings, preserving order.
pub fn plan_decisions(pairings: Vec<Pairing>, options: &SyncOptions) -> Vec<Decision> {
    pairings
        .into_iter()
        .map(|pairing| gate(classify(pairing), options))
        .collect()
}
