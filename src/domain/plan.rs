// src/domain/plan.rs

use crate::domain::reservation::{FieldChange, ReservationRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    Insert(ReservationRecord),
    /// Only vendor-owned fields ever appear in `changes`.
    Update {
        code: String,
        changes: Vec<FieldChange>,
    },
    Unchanged(String),
    MarkCanceled(String),
}

impl MergeAction {
    pub fn code(&self) -> &str {
        match self {
            MergeAction::Insert(record) => &record.confirmation_code,
            MergeAction::Update { code, .. } => code,
            MergeAction::Unchanged(code) | MergeAction::MarkCanceled(code) => code,
        }
    }
}

/// Actions in a fixed order: snapshot order first, then cancellations in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub actions: Vec<MergeAction>,
}

impl MergePlan {
    /// True when applying the plan would not touch any row.
    pub fn is_effectively_empty(&self) -> bool {
        self.actions
            .iter()
            .all(|a| matches!(a, MergeAction::Unchanged(_)))
    }

    /// The summary applying this plan in full would report.
    pub fn expected_summary(&self) -> AppliedSummary {
        let mut summary = AppliedSummary::default();
        for action in &self.actions {
            summary.record(action);
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppliedSummary {
    pub inserted: usize,
    pub updated: usize,
    pub canceled: usize,
}

impl AppliedSummary {
    pub fn record(&mut self, action: &MergeAction) {
        match action {
            MergeAction::Insert(_) => self.inserted += 1,
            MergeAction::Update { .. } => self.updated += 1,
            MergeAction::MarkCanceled(_) => self.canceled += 1,
            MergeAction::Unchanged(_) => {}
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.canceled
    }
}

impl fmt::Display for AppliedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} canceled",
            self.inserted, self.updated, self.canceled
        )
    }
}

/// Limits which absent records may be canceled. A stored record outside the
/// window the snapshot covers is left alone instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancellationScope {
    /// Records that started before this date may be filtered out of the
    /// snapshot, even while the stay is still in progress.
    pub not_before: Option<NaiveDate>,
    /// Records starting on or after this date may sit on a page that was not
    /// fetched. Ties with the last fetched start date are included.
    pub unfetched_from: Option<NaiveDate>,
}

impl CancellationScope {
    pub fn covers(&self, record: &ReservationRecord) -> bool {
        if self.not_before.is_some_and(|from| record.start_date < from) {
            return false;
        }
        if self
            .unfetched_from
            .is_some_and(|from| record.start_date >= from)
        {
            return false;
        }
        true
    }
}
