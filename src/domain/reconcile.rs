// src/domain/reconcile.rs

use crate::domain::plan::{CancellationScope, MergeAction, MergePlan};
use crate::domain::reservation::ReservationRecord;
use crate::domain::store::Store;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("confirmation code {0} appears more than once in the snapshot")]
    DuplicateKey(String),
}

/// Diffs a snapshot against the store. Every stored code missing from the
/// snapshot is marked canceled unless it already is.
pub fn reconcile(
    current: &Store,
    incoming: &[ReservationRecord],
) -> Result<MergePlan, ReconcileError> {
    reconcile_within(current, incoming, &CancellationScope::default())
}

/// Like [`reconcile`], but only cancels absent records the snapshot could
/// have contained according to `scope`.
pub fn reconcile_within(
    current: &Store,
    incoming: &[ReservationRecord],
    scope: &CancellationScope,
) -> Result<MergePlan, ReconcileError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(incoming.len());
    for record in incoming {
        if !seen.insert(record.confirmation_code.as_str()) {
            return Err(ReconcileError::DuplicateKey(
                record.confirmation_code.clone(),
            ));
        }
    }

    let mut actions = Vec::with_capacity(incoming.len());

    for record in incoming {
        let action = match current.get(&record.confirmation_code) {
            None => MergeAction::Insert(record.clone()),
            Some(stored) => {
                let changes = stored.record.diff(record);
                if changes.is_empty() {
                    MergeAction::Unchanged(record.confirmation_code.clone())
                } else {
                    MergeAction::Update {
                        code: record.confirmation_code.clone(),
                        changes,
                    }
                }
            }
        };
        actions.push(action);
    }

    for row in current.rows() {
        let stored = &row.record;
        if seen.contains(stored.confirmation_code.as_str()) || stored.status.is_canceled() {
            continue;
        }
        if scope.covers(stored) {
            actions.push(MergeAction::MarkCanceled(stored.confirmation_code.clone()));
        } else {
            tracing::debug!(
                code = %stored.confirmation_code,
                "absent from snapshot but outside its window, left as is"
            );
        }
    }

    Ok(MergePlan { actions })
}
