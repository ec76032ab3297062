use crate::config::{known_key, Settings};
use crate::errors::SyncError;
use rusqlite::{params, Connection};
use std::collections::HashMap;

#[derive(Debug)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub instructions: String,
}

pub fn get_config_entries(conn: &Connection) -> Result<Vec<ConfigEntry>, SyncError> {
    let mut stmt = conn.prepare("SELECT key, value, instructions FROM config ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(ConfigEntry {
            key: row.get(0)?,
            value: row.get(1)?,
            instructions: row.get(2)?,
        })
    })?;

    let mut entries = Vec::new();
    for r in rows {
        entries.push(r?);
    }
    Ok(entries)
}

pub fn set_config_value(conn: &Connection, key: &str, value: &str) -> Result<(), SyncError> {
    let known = known_key(key)?;
    conn.execute(
        r#"
        INSERT INTO config (key, value, instructions) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![known.key, value, known.instructions],
    )?;
    Ok(())
}

/// Reads and validates settings, with environment overrides for the secrets.
pub fn load_settings(conn: &Connection) -> Result<Settings, SyncError> {
    let entries: HashMap<String, String> = get_config_entries(conn)?
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect();
    Ok(Settings::from_entries(&entries)?.with_env_overrides())
}
