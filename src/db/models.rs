// Data models: Rust structs that map to database rows.
//
// Kept separate from the queries so other modules (pipeline, output, mcp)
// can use them without depending on rusqlite.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detectors::traits::ThreatLevel;
use crate::output::truncate_chars;
use crate::scoring::haunt::haunt_level;
use crate::scoring::AggregateScore;

/// Timestamps are UTC in SQLite's `datetime('now')` format so rows written
/// from Rust and rows defaulted by SQLite sort together.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// How much of the content is kept with a history row.
pub const PREVIEW_CHARS: usize = 200;

/// Where a scored item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Email,
    Comment,
    Review,
    Text,
    OcrImage,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Email => "email",
            ContentType::Comment => "comment",
            ContentType::Review => "review",
            ContentType::Text => "text",
            ContentType::OcrImage => "ocr_image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(ContentType::Email),
            "comment" => Some(ContentType::Comment),
            "review" => Some(ContentType::Review),
            "text" => Some(ContentType::Text),
            "ocr_image" => Some(ContentType::OcrImage),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scored content item in the history table. Scores are rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub user_id: String,
    pub content_type: ContentType,
    pub content_preview: String,
    pub spam_score: u32,
    pub deepfake_score: u32,
    pub toxicity_score: u32,
    pub scam_score: u32,
    pub overall_threat_level: ThreatLevel,
    pub is_threat: bool,
    pub haunt_level: u8,
    pub is_promotional: bool,
    /// Set by the database on insert
    pub analyzed_at: String,
}

impl AnalysisRecord {
    /// Build an unsaved row (id 0) from a verdict.
    pub fn from_score(
        user_id: &str,
        content_type: ContentType,
        content: &str,
        score: &AggregateScore,
    ) -> Self {
        Self {
            id: 0,
            user_id: user_id.to_string(),
            content_type,
            content_preview: content.chars().take(PREVIEW_CHARS).collect(),
            spam_score: round_score(score.spam),
            deepfake_score: round_score(score.deepfake),
            toxicity_score: round_score(score.toxicity),
            scam_score: round_score(score.scam),
            overall_threat_level: score.overall,
            is_threat: score.is_threat,
            haunt_level: haunt_level(score),
            is_promotional: false,
            analyzed_at: now_timestamp(),
        }
    }

    pub fn max_score(&self) -> u32 {
        self.spam_score
            .max(self.deepfake_score)
            .max(self.toxicity_score)
            .max(self.scam_score)
    }

    /// Short one-line preview for listings.
    pub fn short_preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.content_preview.replace('\n', " "), max_chars)
    }
}

/// Round a 0-100 confidence to a whole percentage.
pub fn round_score(score: f64) -> u32 {
    score.clamp(0.0, 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ThreatDetected,
    Milestone,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ThreatDetected => "threat_detected",
            NotificationKind::Milestone => "milestone",
            NotificationKind::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "threat_detected" => Some(NotificationKind::ThreatDetected),
            "milestone" => Some(NotificationKind::Milestone),
            "system" => Some(NotificationKind::System),
            _ => None,
        }
    }
}

/// A user-facing notification raised after a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub analysis_id: Option<i64>,
    pub created_at: String,
}

impl Notification {
    /// An unsaved, unread notification.
    pub fn new(user_id: &str, kind: NotificationKind, title: &str, message: String) -> Self {
        Self {
            id: 0,
            user_id: user_id.to_string(),
            title: title.to_string(),
            message,
            kind,
            is_read: false,
            analysis_id: None,
            created_at: now_timestamp(),
        }
    }
}

/// Per-user totals over the history table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total_scans: u64,
    pub threats_detected: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub last_scan_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::aggregate;

    #[test]
    fn record_rounds_scores_and_truncates_preview() {
        let score = aggregate(35.4, 0.0, 71.5, 49.99);
        let content = "x".repeat(500);
        let record = AnalysisRecord::from_score("u1", ContentType::Email, &content, &score);
        assert_eq!(record.spam_score, 35);
        assert_eq!(record.toxicity_score, 72);
        assert_eq!(record.scam_score, 50);
        assert_eq!(record.content_preview.chars().count(), PREVIEW_CHARS);
        assert_eq!(record.overall_threat_level, ThreatLevel::High);
        assert_eq!(record.max_score(), 72);
    }

    #[test]
    fn timestamps_match_sqlite_datetime_format() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn content_type_round_trips_through_str() {
        for ct in [
            ContentType::Email,
            ContentType::Comment,
            ContentType::Review,
            ContentType::Text,
            ContentType::OcrImage,
        ] {
            assert_eq!(ContentType::parse(ct.as_str()), Some(ct));
        }
        assert_eq!(ContentType::parse("sms"), None);
    }
}
