//! Database migrations
//!
//! The gate keeps a flat key/value `settings` table; the session keys
//! (`profileAuthenticated`, `authToken`, `tokenExpiry`, ...) live there.

use crate::Result;
use rusqlite::Connection;

type Migration = fn(&Connection) -> Result<()>;

/// Applied in order; the position + 1 is the schema version it produces.
const MIGRATIONS: &[Migration] = &[migrate_v1];

const SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;

    for (index, migrate) in MIGRATIONS.iter().enumerate() {
        let version = index as i32 + 1;
        if version > current {
            migrate(conn)?;
        }
    }

    if current != SCHEMA_VERSION {
        conn.execute("DELETE FROM schema_version", [])?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1: settings store");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    )?;

    Ok(())
}
