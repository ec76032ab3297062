use crate::domain::plan::AppliedSummary;
use crate::errors::SyncError;
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct SyncRun {
    pub id: i64,
    pub source: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub inserted: Option<i64>,
    pub updated: Option<i64>,
    pub canceled: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn start_sync_run(conn: &Connection, source: &str, now: i64) -> Result<i64, SyncError> {
    conn.execute(
        "INSERT INTO sync_runs (source, started_at, success) VALUES (?, ?, 0)",
        params![source, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Closes a run. `summary` is what was written, also on failure.
pub fn end_sync_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    summary: Option<&AppliedSummary>,
    error: Option<String>,
) -> Result<(), SyncError> {
    let count = |f: fn(&AppliedSummary) -> usize| summary.map(|s| f(s) as i64);
    conn.execute(
        "UPDATE sync_runs SET finished_at = ?, inserted = ?, updated = ?, canceled = ?, success = ?, error_message = ? WHERE id = ?",
        params![
            now,
            count(|s| s.inserted),
            count(|s| s.updated),
            count(|s| s.canceled),
            error.is_none(),
            error,
            run_id
        ],
    )?;
    Ok(())
}

pub fn get_recent_runs(conn: &Connection, limit: u32) -> Result<Vec<SyncRun>, SyncError> {
    let mut stmt = conn.prepare(
        "SELECT id, source, started_at, finished_at, inserted, updated, canceled, success, error_message FROM sync_runs ORDER BY started_at DESC, id DESC LIMIT ?",
    )?;

    let rows = stmt.query_map([limit], |row| {
        Ok(SyncRun {
            id: row.get(0)?,
            source: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            inserted: row.get(4)?,
            updated: row.get(5)?,
            canceled: row.get(6)?,
            success: row.get(7)?,
            error_message: row.get(8)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
