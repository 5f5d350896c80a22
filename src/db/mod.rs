// Database layer: SQLite storage for analysis history, notifications, and
// settings.
//
// rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever TRUST_GUARDIAN_DB_PATH points.

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use traits::Database;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

use sqlite::SqliteDatabase;

/// Open (or create) the database and run migrations.
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // WAL so a running MCP server and a CLI invocation can share the file
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open the SQLite backend. The concrete type is returned so callers can
/// hand it out both as a `Database` and as a `SettingsStore`.
pub fn open_sqlite(db_path: &str) -> Result<Arc<SqliteDatabase>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}
