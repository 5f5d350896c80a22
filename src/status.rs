// System status display: database, detector backends, steering, history.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::output::terminal;
use crate::steering::SteeringConfig;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, config: &Config, steering: &SteeringConfig) -> Result<()> {
    let file_size = std::fs::metadata(&config.db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", config.db_path, file_size);
    println!("Detectors: {}", config.remote_summary());
    println!("User: {}", config.user_id);
    println!();

    terminal::display_steering(steering);
    println!();

    let stats = db.get_history_stats(&config.user_id).await?;
    terminal::display_stats(&stats);
    if stats.total_scans == 0 {
        println!("  Run `trust-guardian analyze \"...\"` to score something");
    }

    let unread = db.get_notifications(&config.user_id, true, 100).await?;
    println!("Unread notifications: {}", unread.len());

    Ok(())
}

/// Whether the database file exists yet (status is read-only otherwise).
pub fn database_exists(config: &Config) -> bool {
    Path::new(&config.db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
