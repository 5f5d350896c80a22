// Database schema: table creation and migrations.
//
// A `schema_version` table tracks which migrations have run; each migration
// is a function that executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent, so safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per scored content item
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            content_type TEXT NOT NULL,        -- email / comment / review / text / ocr_image
            content_preview TEXT NOT NULL,     -- first 200 characters
            spam_score INTEGER NOT NULL,       -- 0 to 100, rounded
            deepfake_score INTEGER NOT NULL,
            toxicity_score INTEGER NOT NULL,
            scam_score INTEGER NOT NULL,
            overall_threat_level TEXT NOT NULL, -- low / medium / high
            is_threat INTEGER NOT NULL,
            haunt_level INTEGER NOT NULL DEFAULT 0,
            analyzed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Notifications raised when a scan finds threats
        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            kind TEXT NOT NULL,                -- threat_detected / milestone / system
            is_read INTEGER NOT NULL DEFAULT 0,
            analysis_id INTEGER REFERENCES analyses(id),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Key-value settings (the steering config lives under one key)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_analyses_user
            ON analyses(user_id, analyzed_at);

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, is_read);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: promotional flag on history rows, set by the inbox
    // scanner so marketing mail can be listed apart from personal mail.
    run_migration(conn, 2, |c| {
        c.execute_batch(
            "ALTER TABLE analyses ADD COLUMN is_promotional INTEGER NOT NULL DEFAULT 0;",
        )
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
