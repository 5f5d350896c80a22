// Database trait: async interface for the history, notification, and
// settings storage the CLI and MCP server record into.
//
// Async so callers in the scoring pipeline can await storage without caring
// whether the backend is blocking (rusqlite behind a Mutex) or native async.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{AnalysisRecord, HistoryStats, Notification};
use crate::steering::SettingsStore;

#[async_trait]
pub trait Database: SettingsStore + Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Analysis history ---

    /// Save a scored item and return its ID.
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<i64>;

    /// A user's most recent analyses, newest first.
    async fn get_recent_analyses(
        &self,
        user_id: &str,
        limit: u32,
        threats_only: bool,
    ) -> Result<Vec<AnalysisRecord>>;

    /// Totals across a user's history.
    async fn get_history_stats(&self, user_id: &str) -> Result<HistoryStats>;

    // --- Notifications ---

    /// Store a notification and return its ID.
    async fn create_notification(&self, notification: &Notification) -> Result<i64>;

    /// A user's notifications, newest first.
    async fn get_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>>;

    /// Mark all of a user's notifications read; returns how many changed.
    async fn mark_notifications_read(&self, user_id: &str) -> Result<usize>;
}
