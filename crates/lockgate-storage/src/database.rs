//! Database connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::Result;

/// A single change to the `settings` table, applied as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    Put { key: String, value: String },
    Remove { key: String },
}

impl SettingChange {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        SettingChange::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        SettingChange::Remove { key: key.into() }
    }
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps readers off the writer's back; FULL fsyncs every commit
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Read several keys in one pass. Missing keys are absent from the map.
    pub fn get_settings(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
            let mut values = HashMap::with_capacity(keys.len());
            for key in keys {
                let value: Option<String> = stmt.query_row([key], |row| row.get(0)).optional()?;
                if let Some(value) = value {
                    values.insert(key.to_string(), value);
                }
            }
            Ok(values)
        })
    }

    /// Apply a batch of changes atomically: either every change is
    /// committed or none is.
    pub fn apply_settings(&self, changes: &[SettingChange]) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let updated_at = Utc::now().to_rfc3339();
        self.transaction(|conn| {
            for change in changes {
                match change {
                    SettingChange::Put { key, value } => {
                        conn.execute(
                            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                            rusqlite::params![key, value, updated_at],
                        )?;
                    }
                    SettingChange::Remove { key } => {
                        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
                    }
                }
            }
            Ok(())
        })?;

        tracing::trace!(count = changes.len(), "Applied settings batch");

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
