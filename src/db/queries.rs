// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{AnalysisRecord, ContentType, HistoryStats, Notification, NotificationKind};
use crate::detectors::traits::ThreatLevel;

// --- Settings ---

/// Get a setting value by key.
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a setting value (upsert).
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

// --- Analyses ---

/// Record a scored item and return its row ID.
pub fn insert_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO analyses (user_id, content_type, content_preview, spam_score,
            deepfake_score, toxicity_score, scam_score, overall_threat_level, is_threat,
            haunt_level, is_promotional, analyzed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.user_id,
            record.content_type.as_str(),
            record.content_preview,
            record.spam_score,
            record.deepfake_score,
            record.toxicity_score,
            record.scam_score,
            record.overall_threat_level.as_str(),
            record.is_threat,
            record.haunt_level,
            record.is_promotional,
            record.analyzed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent analyses for a user, newest first.
pub fn get_recent_analyses(
    conn: &Connection,
    user_id: &str,
    limit: u32,
    threats_only: bool,
) -> Result<Vec<AnalysisRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, content_type, content_preview, spam_score, deepfake_score,
                toxicity_score, scam_score, overall_threat_level, is_threat, haunt_level,
                is_promotional, analyzed_at
         FROM analyses
         WHERE user_id = ?1 AND (?2 = 0 OR is_threat = 1)
         ORDER BY analyzed_at DESC, id DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![user_id, threats_only, limit], analysis_from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    let content_type: String = row.get(2)?;
    let level: String = row.get(8)?;
    Ok(AnalysisRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        // Unknown values can only come from a hand-edited DB; show them as text
        content_type: ContentType::parse(&content_type).unwrap_or(ContentType::Text),
        content_preview: row.get(3)?,
        spam_score: row.get(4)?,
        deepfake_score: row.get(5)?,
        toxicity_score: row.get(6)?,
        scam_score: row.get(7)?,
        overall_threat_level: ThreatLevel::parse(&level).unwrap_or(ThreatLevel::Low),
        is_threat: row.get(9)?,
        haunt_level: row.get(10)?,
        is_promotional: row.get(11)?,
        analyzed_at: row.get(12)?,
    })
}

/// Totals for a user's history.
pub fn get_history_stats(conn: &Connection, user_id: &str) -> Result<HistoryStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(is_threat), 0),
                COALESCE(SUM(overall_threat_level = 'high'), 0),
                COALESCE(SUM(overall_threat_level = 'medium'), 0),
                COALESCE(SUM(overall_threat_level = 'low'), 0),
                MAX(analyzed_at)
         FROM analyses
         WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(HistoryStats {
                total_scans: row.get::<_, i64>(0)? as u64,
                threats_detected: row.get::<_, i64>(1)? as u64,
                high: row.get::<_, i64>(2)? as u64,
                medium: row.get::<_, i64>(3)? as u64,
                low: row.get::<_, i64>(4)? as u64,
                last_scan_at: row.get(5)?,
            })
        },
    )?;
    Ok(stats)
}

// --- Notifications ---

/// Store a notification and return its row ID.
pub fn insert_notification(conn: &Connection, notification: &Notification) -> Result<i64> {
    conn.execute(
        "INSERT INTO notifications (user_id, title, message, kind, is_read, analysis_id,
            created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            notification.user_id,
            notification.title,
            notification.message,
            notification.kind.as_str(),
            notification.is_read,
            notification.analysis_id,
            notification.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A user's notifications, newest first.
pub fn get_notifications(
    conn: &Connection,
    user_id: &str,
    unread_only: bool,
    limit: u32,
) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, message, kind, is_read, analysis_id, created_at
         FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
         ORDER BY created_at DESC, id DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![user_id, unread_only, limit], |row| {
        let kind: String = row.get(4)?;
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            message: row.get(3)?,
            kind: NotificationKind::parse(&kind).unwrap_or(NotificationKind::System),
            is_read: row.get(5)?,
            analysis_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

/// Mark every unread notification for a user as read. Returns how many changed.
pub fn mark_notifications_read(conn: &Connection, user_id: &str) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
    )?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::scoring::aggregate;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn record(user: &str, spam: f64) -> AnalysisRecord {
        AnalysisRecord::from_score(
            user,
            ContentType::Comment,
            "some content",
            &aggregate(spam, 0.0, 0.0, 0.0),
        )
    }

    #[test]
    fn settings_roundtrip() {
        let conn = test_db();
        assert_eq!(get_setting(&conn, "k").unwrap(), None);
        set_setting(&conn, "k", "v1").unwrap();
        set_setting(&conn, "k", "v2").unwrap();
        assert_eq!(get_setting(&conn, "k").unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn analyses_insert_and_list() {
        let conn = test_db();
        let first = insert_analysis(&conn, &record("alice", 10.0)).unwrap();
        let second = insert_analysis(&conn, &record("alice", 80.0)).unwrap();
        insert_analysis(&conn, &record("bob", 50.0)).unwrap();
        assert!(second > first);

        let all = get_recent_analyses(&conn, "alice", 10, false).unwrap();
        assert_eq!(all.len(), 2);
        // Same second: id breaks the tie, newest first
        assert_eq!(all[0].id, second);
        assert_eq!(all[0].overall_threat_level, ThreatLevel::High);
        assert_eq!(all[0].content_type, ContentType::Comment);
        assert!(!all[0].analyzed_at.is_empty());

        let threats = get_recent_analyses(&conn, "alice", 10, true).unwrap();
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].spam_score, 80);
    }

    #[test]
    fn history_stats_counts_levels() {
        let conn = test_db();
        for spam in [0.0, 41.0, 50.0, 90.0] {
            insert_analysis(&conn, &record("alice", spam)).unwrap();
        }
        let stats = get_history_stats(&conn, "alice").unwrap();
        assert_eq!(stats.total_scans, 4);
        assert_eq!(stats.threats_detected, 3);
        assert_eq!((stats.high, stats.medium, stats.low), (1, 2, 1));
        assert!(stats.last_scan_at.is_some());

        let empty = get_history_stats(&conn, "nobody").unwrap();
        assert_eq!(empty.total_scans, 0);
        assert!(empty.last_scan_at.is_none());
    }

    #[test]
    fn notifications_unread_filter_and_mark_read() {
        let conn = test_db();
        let analysis_id = insert_analysis(&conn, &record("alice", 80.0)).unwrap();
        let mut n = Notification::new(
            "alice",
            NotificationKind::ThreatDetected,
            "Threat Detected",
            "HIGH risk".to_string(),
        );
        n.analysis_id = Some(analysis_id);
        insert_notification(&conn, &n).unwrap();

        let unread = get_notifications(&conn, "alice", true, 10).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].analysis_id, Some(analysis_id));
        assert_eq!(unread[0].kind, NotificationKind::ThreatDetected);

        assert_eq!(mark_notifications_read(&conn, "alice").unwrap(), 1);
        assert!(get_notifications(&conn, "alice", true, 10).unwrap().is_empty());
        assert_eq!(get_notifications(&conn, "alice", false, 10).unwrap().len(), 1);
    }
}
