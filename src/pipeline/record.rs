// Recorder: hands verdicts to the history store and raises notifications.
//
// Storage is a collaborator, not part of the verdict: callers log recorder
// errors and keep the score they already have.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::db::models::{AnalysisRecord, ContentType, Notification, NotificationKind};
use crate::db::Database;
use crate::scoring::AggregateScore;

pub struct Recorder {
    db: Arc<dyn Database>,
    user_id: String,
}

impl Recorder {
    pub fn new(db: Arc<dyn Database>, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    /// Save one verdict and, if it is a threat, a notification pointing at it.
    pub async fn record(
        &self,
        content_type: ContentType,
        content: &str,
        score: &AggregateScore,
    ) -> Result<i64> {
        let id = self.save(content_type, content, score, false).await?;
        if let Some(mut notification) = threat_notification(&self.user_id, score) {
            notification.analysis_id = Some(id);
            self.db.create_notification(&notification).await?;
            info!(analysis_id = id, level = %score.overall, "Threat notification raised");
        }
        Ok(id)
    }

    /// Save one verdict without notifying.
    pub async fn save(
        &self,
        content_type: ContentType,
        content: &str,
        score: &AggregateScore,
        is_promotional: bool,
    ) -> Result<i64> {
        let mut record = AnalysisRecord::from_score(&self.user_id, content_type, content, score);
        record.is_promotional = is_promotional;
        self.db.save_analysis(&record).await
    }

    /// One summary notification for a batch that found `threats` threats.
    pub async fn notify_batch(&self, content_type: ContentType, threats: usize) -> Result<()> {
        if let Some(notification) = batch_notification(&self.user_id, content_type, threats) {
            self.db.create_notification(&notification).await?;
            info!(threats, "Batch threat notification raised");
        }
        Ok(())
    }
}

/// The notification for a single threatening item, if it is one.
pub fn threat_notification(user_id: &str, score: &AggregateScore) -> Option<Notification> {
    if !score.is_threat {
        return None;
    }
    Some(Notification::new(
        user_id,
        NotificationKind::ThreatDetected,
        "Threat Detected",
        format!(
            "{} risk content detected with {}% confidence",
            score.overall.as_str().to_uppercase(),
            score.max_score().round()
        ),
    ))
}

/// The summary notification for a batch, if it found anything.
pub fn batch_notification(
    user_id: &str,
    content_type: ContentType,
    threats: usize,
) -> Option<Notification> {
    if threats == 0 {
        return None;
    }
    let notification = match content_type {
        ContentType::Email => Notification::new(
            user_id,
            NotificationKind::ThreatDetected,
            "Email Threats Detected!",
            format!(
                "Found {threats} threatening emails in your inbox. Review and delete them now!"
            ),
        ),
        other => Notification::new(
            user_id,
            NotificationKind::ThreatDetected,
            "Threats Detected",
            format!("Found {threats} threatening {} items in this batch.", other.as_str()),
        ),
    };
    Some(notification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::SqliteDatabase;
    use crate::scoring::aggregate;

    #[test]
    fn no_notification_below_threshold() {
        assert!(threat_notification("u", &aggregate(40.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn threat_message_uses_level_and_rounded_max() {
        let n = threat_notification("u", &aggregate(0.0, 0.0, 71.43, 20.0)).unwrap();
        assert_eq!(n.message, "HIGH risk content detected with 71% confidence");
        assert_eq!(n.kind, NotificationKind::ThreatDetected);
    }

    #[test]
    fn batch_message_depends_on_content_type() {
        assert!(batch_notification("u", ContentType::Email, 0).is_none());
        let n = batch_notification("u", ContentType::Email, 3).unwrap();
        assert_eq!(n.title, "Email Threats Detected!");
        assert!(n.message.starts_with("Found 3 threatening emails"));
        let n = batch_notification("u", ContentType::Review, 2).unwrap();
        assert_eq!(n.message, "Found 2 threatening review items in this batch.");
    }

    #[tokio::test]
    async fn record_links_notification_to_analysis() {
        let db = Arc::new(SqliteDatabase::in_memory().unwrap());
        let recorder = Recorder::new(db.clone(), "alice");

        let safe = recorder
            .record(ContentType::Text, "hello", &aggregate(0.0, 0.0, 0.0, 0.0))
            .await
            .unwrap();
        let threat = recorder
            .record(ContentType::Text, "boo", &aggregate(0.0, 0.0, 0.0, 80.0))
            .await
            .unwrap();
        assert_ne!(safe, threat);

        let notifications = db.get_notifications("alice", false, 10).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].analysis_id, Some(threat));
    }
}
