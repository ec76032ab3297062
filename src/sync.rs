// src/sync.rs
use crate::config::Settings;
use crate::db::config_table::load_settings;
use crate::db::lock::RunLock;
use crate::db::runs::{end_sync_run, start_sync_run};
use crate::db::{Database, SqliteStore};
use crate::domain::layout;
use crate::domain::plan::{AppliedSummary, CancellationScope, MergeAction};
use crate::domain::reconcile::{reconcile, reconcile_within};
use crate::domain::reservation::ReservationRecord;
use crate::domain::store::StoreAccessor;
use crate::errors::SyncError;
use crate::report::RunReport;
use crate::source::{parse_snapshot, ReservationSource, SnapshotWindow};
use chrono::{NaiveDate, Utc};

/// One full run: settings, source, lock, fetch, reconcile, apply. Every
/// failure ends up in the returned report.
pub fn execute<F, S>(db: &Database, today: NaiveDate, build_source: F) -> RunReport
where
    F: FnOnce(&Settings) -> Result<S, SyncError>,
    S: ReservationSource,
{
    let outcome = guarded_run(db, today, build_source);
    if let Err(e) = &outcome {
        tracing::error!("sync failed: {e}");
    }
    RunReport::from_outcome(&outcome)
}

fn guarded_run<F, S>(db: &Database, today: NaiveDate, build_source: F) -> Result<AppliedSummary, SyncError>
where
    F: FnOnce(&Settings) -> Result<S, SyncError>,
    S: ReservationSource,
{
    let settings = db.with_conn(|conn| load_settings(conn))?;
    let source = build_source(&settings)?;
    let label = source.describe();

    let _lock = RunLock::acquire(db, &label, Utc::now().timestamp())?;
    let run_id = db.with_conn(|conn| start_sync_run(conn, &label, Utc::now().timestamp()))?;

    let result = run_sync(db, &settings, &source, today);

    let (summary, error) = match &result {
        Ok(summary) => (Some(*summary), None),
        Err(SyncError::Apply(e)) => (Some(e.summary), Some(e.to_string())),
        Err(e) => (None, Some(e.to_string())),
    };
    let recorded = db.with_conn(|conn| {
        end_sync_run(conn, run_id, Utc::now().timestamp(), summary.as_ref(), error)
    });
    if let Err(e) = recorded {
        tracing::warn!(run_id, "could not record run outcome: {e}");
    }

    result
}

/// Fetch, parse, reconcile, apply. The whole plan is computed before the
/// first write, so anything failing before `apply` leaves the store as it was.
pub fn run_sync<S: ReservationSource + ?Sized>(
    db: &Database,
    settings: &Settings,
    source: &S,
    today: NaiveDate,
) -> Result<AppliedSummary, SyncError> {
    let window = SnapshotWindow {
        date_min: today,
        page_size: settings.page_size,
    };

    tracing::info!(source = %source.describe(), date_min = %today, "fetching reservations");
    let raw = source.fetch_snapshot(&window)?;
    let incoming = parse_snapshot(&raw)?;
    tracing::info!(count = incoming.len(), "parsed reservations snapshot");

    let scope = source
        .is_windowed()
        .then(|| cancellation_scope(&incoming, &window));

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        let (current, _schema) = store.load()?;
        if current.is_empty() {
            tracing::info!("reservations table is empty, every reservation will be added");
        }
        let plan = match &scope {
            Some(scope) => reconcile_within(&current, &incoming, scope)?,
            None => reconcile(&current, &incoming)?,
        };
        if plan.is_effectively_empty() {
            tracing::info!(stored = current.len(), "reservations already up to date");
        }

        let expected = plan.expected_summary();
        let unchanged = plan
            .actions
            .iter()
            .filter(|a| matches!(a, MergeAction::Unchanged(_)))
            .count();
        tracing::info!(
            inserted = expected.inserted,
            updated = expected.updated,
            canceled = expected.canceled,
            unchanged,
            "merge plan ready"
        );

        Ok(layout::apply(&mut store, &plan, &settings.layout)?)
    })
}

/// Records that started before the window, or that start on or after the last
/// date a full page reached, cannot be judged by their absence.
pub fn cancellation_scope(
    incoming: &[ReservationRecord],
    window: &SnapshotWindow,
) -> CancellationScope {
    let page_full = incoming.len() >= window.page_size as usize;
    let unfetched_from = if page_full {
        let last = incoming.iter().map(|r| r.start_date).max();
        tracing::warn!(
            page_size = window.page_size,
            last_start = ?last,
            "snapshot filled a whole page; later reservations were not fetched"
        );
        last
    } else {
        None
    };

    CancellationScope {
        not_before: Some(window.date_min),
        unfetched_from,
    }
}
