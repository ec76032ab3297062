use crate::config::CONFIG_KEYS;
use crate::errors::SyncError;
use rusqlite::{params, Connection};
use std::cell::RefCell;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot, tagged with the path it was opened for.
thread_local! {
    static DB_CONN: RefCell<Option<(String, Connection)>> = const { RefCell::new(None) };
}

#[derive(Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides this thread's connection to the closure, opening it on first use.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SyncError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let reopen = !matches!(slot.as_ref(), Some((path, _)) if *path == self.path);
                if reopen {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| SyncError::Db(format!("Open DB failed: {e}")))?;
                    *slot = Some((self.path.clone(), conn));
                }
                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(SyncError::Db("connection slot empty".to_string())),
                }
            })
            .map_err(|_| SyncError::Db("thread-local connection unavailable".to_string()))?
    }
}

/// Creates missing tables and seeds the config table with placeholders.
pub fn init_db(db: &Database) -> Result<(), SyncError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| SyncError::Db(format!("Failed to apply schema: {e}")))?;

        for key in CONFIG_KEYS {
            conn.execute(
                "INSERT OR IGNORE INTO config (key, value, instructions) VALUES (?1, ?2, ?3)",
                params![key.key, key.default, key.instructions],
            )?;
        }
        Ok(())
    })?;

    tracing::debug!(path = db.path(), "database initialized");
    Ok(())
}
