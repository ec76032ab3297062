use crate::db::connection::Database;
use crate::errors::SyncError;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

/// Locks older than this are left over from a crashed run.
pub const STALE_AFTER_SECS: i64 = 30 * 60;

/// Guards the store for the duration of one run. Released on drop, unless
/// another run has taken it over as stale in the meantime.
pub struct RunLock<'a> {
    db: &'a Database,
    holder: String,
    acquired_at: i64,
}

impl<'a> RunLock<'a> {
    pub fn acquire(db: &'a Database, holder: &str, now: i64) -> Result<Self, SyncError> {
        db.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<(String, i64)> = tx
                .query_row(
                    "SELECT holder, acquired_at FROM sync_lock WHERE id = 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            if let Some((other, acquired_at)) = existing {
                if now - acquired_at < STALE_AFTER_SECS {
                    return Err(SyncError::Locked(format!(
                        "held by {other} since {acquired_at}"
                    )));
                }
                tracing::warn!(%other, acquired_at, "taking over stale sync lock");
            }

            tx.execute(
                "INSERT OR REPLACE INTO sync_lock (id, holder, acquired_at) VALUES (1, ?1, ?2)",
                params![holder, now],
            )?;
            tx.commit()?;
            Ok(())
        })?;

        tracing::debug!(holder, "sync lock acquired");
        Ok(Self {
            db,
            holder: holder.to_string(),
            acquired_at: now,
        })
    }
}

impl Drop for RunLock<'_> {
    fn drop(&mut self) {
        let released = self.db.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM sync_lock WHERE id = 1 AND holder = ?1 AND acquired_at = ?2",
                params![self.holder, self.acquired_at],
            )?)
        });
        match released {
            Ok(0) => tracing::warn!(holder = %self.holder, "sync lock was taken over; left in place"),
            Ok(_) => {}
            Err(e) => tracing::warn!("failed to release sync lock: {e}"),
        }
    }
}
