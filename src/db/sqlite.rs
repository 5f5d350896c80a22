// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{AnalysisRecord, HistoryStats, Notification};
use super::traits::Database;
use crate::steering::SettingsStore;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// A fresh in-memory database with all tables created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl SettingsStore for SqliteDatabase {
    async fn load_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_setting(&conn, key)
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_setting(&conn, key, value)
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_analysis(&conn, record)
    }

    async fn get_recent_analyses(
        &self,
        user_id: &str,
        limit: u32,
        threats_only: bool,
    ) -> Result<Vec<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        super::queries::get_recent_analyses(&conn, user_id, limit, threats_only)
    }

    async fn get_history_stats(&self, user_id: &str) -> Result<HistoryStats> {
        let conn = self.conn.lock().await;
        super::queries::get_history_stats(&conn, user_id)
    }

    async fn create_notification(&self, notification: &Notification) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_notification(&conn, notification)
    }

    async fn get_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().await;
        super::queries::get_notifications(&conn, user_id, unread_only, limit)
    }

    async fn mark_notifications_read(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::mark_notifications_read(&conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ContentType;
    use crate::scoring::aggregate;

    #[tokio::test]
    async fn trait_settings_roundtrip() {
        let db = SqliteDatabase::in_memory().unwrap();
        assert_eq!(db.load_setting("cfg").await.unwrap(), None);
        db.save_setting("cfg", "{}").await.unwrap();
        assert_eq!(db.load_setting("cfg").await.unwrap(), Some("{}".to_string()));
    }

    #[tokio::test]
    async fn trait_analysis_roundtrip() {
        let db = SqliteDatabase::in_memory().unwrap();
        let record = AnalysisRecord::from_score(
            "local",
            ContentType::Review,
            "five stars, click here",
            &aggregate(35.0, 0.0, 0.0, 0.0),
        );
        let id = db.save_analysis(&record).await.unwrap();
        let loaded = db.get_recent_analyses("local", 5, false).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].content_preview, "five stars, click here");
        assert_eq!(loaded[0].haunt_level, 1);
        assert_eq!(db.table_count().await.unwrap(), 4);
    }
}
