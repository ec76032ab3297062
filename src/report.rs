// src/report.rs
use crate::domain::plan::AppliedSummary;
use crate::errors::SyncError;
use serde::Serialize;

/// The single outcome a run hands back to whoever invoked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub message: String,
    /// What was written. Present on success and on a partial apply failure.
    pub summary: Option<AppliedSummary>,
}

impl RunReport {
    pub fn from_outcome(outcome: &Result<AppliedSummary, SyncError>) -> Self {
        match outcome {
            Ok(summary) => RunReport {
                success: true,
                message: format!("Reservations synced: {summary}"),
                summary: Some(*summary),
            },
            Err(err) => RunReport {
                success: false,
                message: err.to_string(),
                summary: match err {
                    SyncError::Apply(partial) => Some(partial.summary),
                    _ => None,
                },
            },
        }
    }
}
