// src/domain/layout.rs

use crate::domain::operational::{Cell, CityTaxPolicy, OperationalField, OperationalSet};
use crate::domain::plan::{AppliedSummary, MergeAction, MergePlan};
use crate::domain::reservation::{FieldValue, ReservationStatus, VendorField};
use crate::domain::store::{ColumnSpec, SortOrder, StoreAccessor, StoreError};

/// Display format for the date columns, in spreadsheet number-format syntax.
pub const DATE_FORMAT: &str = "m/d/yyyy";

/// How the store is laid out after every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPolicy {
    pub sort: SortOrder,
    pub operational: OperationalSet,
    pub city_tax: CityTaxPolicy,
    /// Empty the note column on every run.
    pub clear_notes: bool,
}

/// A write failed partway; `summary` counts what was already written.
#[derive(Debug, thiserror::Error)]
#[error("{message} (after {summary})")]
pub struct ApplyError {
    pub summary: AppliedSummary,
    pub message: String,
}

/// Writes a merge plan into the store, then restores the layout: operational
/// columns present and defaulted, rows sorted by start date, dates formatted.
///
/// Rows are written one action at a time with no enclosing transaction, so a
/// failure leaves the earlier actions in place and reports them.
pub fn apply<S: StoreAccessor>(
    store: &mut S,
    plan: &MergePlan,
    policy: &LayoutPolicy,
) -> Result<AppliedSummary, ApplyError> {
    let mut summary = AppliedSummary::default();

    for action in &plan.actions {
        let result = match action {
            MergeAction::Insert(record) => store.append_rows(std::slice::from_ref(record)),
            MergeAction::Update { code, changes } => {
                let fields: Vec<(VendorField, FieldValue)> = changes
                    .iter()
                    .map(|c| (c.field, c.current.clone()))
                    .collect();
                store.update_row(code, &fields)
            }
            MergeAction::MarkCanceled(code) => store.update_row(
                code,
                &[(
                    VendorField::Status,
                    FieldValue::Text(ReservationStatus::Canceled.as_str().to_string()),
                )],
            ),
            MergeAction::Unchanged(_) => Ok(()),
        };

        result.map_err(|e| ApplyError {
            summary,
            message: format!("failed to write reservation {}: {e}", action.code()),
        })?;

        if let MergeAction::Update { code, changes } = action {
            for change in changes {
                tracing::debug!(
                    %code,
                    field = change.field.column(),
                    "{} -> {}",
                    change.previous,
                    change.current
                );
            }
        }
        summary.record(action);
    }

    relayout(store, policy).map_err(|e| ApplyError {
        summary,
        message: format!("failed to lay out reservations: {e}"),
    })?;

    tracing::info!(rows_written = summary.total(), "merge plan applied");
    Ok(summary)
}

fn relayout<S: StoreAccessor>(store: &mut S, policy: &LayoutPolicy) -> Result<(), StoreError> {
    let fields = policy.operational.fields();

    let specs: Vec<ColumnSpec> = fields
        .iter()
        .map(|f| ColumnSpec {
            name: f.column(),
            kind: f.kind(),
        })
        .collect();
    let added = store.ensure_columns(&specs)?;
    if !added.is_empty() {
        tracing::info!(columns = ?added, "added operational columns");
    }

    for field in fields {
        store.fill_missing(field.column(), &policy.city_tax.default_cell(*field))?;
    }

    if policy.clear_notes && fields.contains(&OperationalField::Note) {
        store.set_column(OperationalField::Note.column(), &Cell::Text(String::new()))?;
    }

    store.sort_by(VendorField::StartDate.column(), policy.sort.ascending())?;

    for field in VendorField::ALL.into_iter().filter(|f| f.is_date()) {
        store.set_number_format(field.column(), DATE_FORMAT)?;
    }

    Ok(())
}
