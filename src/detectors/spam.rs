// Spam detector: hosted SMS-spam model, falling back to a phrase list.

use std::sync::Arc;

use async_trait::async_trait;

use super::heuristic_confidence;
use super::remote::{detect_with_fallback, RemoteClassifier};
use super::traits::{DetectionResult, DetectorKind, ThreatDetector};

/// Phrases matched as substrings of the lower-cased content.
pub const SPAM_KEYWORDS: &[&str] = &[
    "winner",
    "congratulations",
    "claim",
    "prize",
    "free",
    "free money",
    "free gift",
    "click here",
    "act now",
    "limited time",
    "urgent",
    "verify account",
    "suspended",
    "confirm identity",
    "bitcoin",
    "crypto",
    "investment opportunity",
    "make money",
    "work from home",
    "earn cash",
    "get paid",
    "no experience",
    "viagra",
    "cialis",
    "weight loss",
    "diet pills",
    "miracle cure",
    "unsubscribe",
    "opt out",
    "remove",
    "mlm",
    "multi-level",
    "guarantee",
    "100%",
    "risk free",
    "no risk",
    "limited offer",
];

pub struct SpamDetector {
    remote: Option<Arc<dyn RemoteClassifier>>,
}

impl SpamDetector {
    pub fn new(remote: Option<Arc<dyn RemoteClassifier>>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ThreatDetector for SpamDetector {
    fn name(&self) -> &'static str {
        "Spam Detector"
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Spam
    }

    async fn detect(&self, content: &str) -> DetectionResult {
        detect_with_fallback(self.kind(), self.remote.as_deref(), content, |c| {
            self.heuristic(c)
        })
        .await
    }

    fn heuristic(&self, content: &str) -> DetectionResult {
        let lower = content.to_lowercase();
        let matches: Vec<&str> = SPAM_KEYWORDS
            .iter()
            .copied()
            .filter(|keyword| lower.contains(keyword))
            .collect();

        let confidence = heuristic_confidence(matches.len(), 20, 35);
        let details = if matches.is_empty() {
            "No spam indicators".to_string()
        } else {
            format!("Spam keywords detected: {}", matches.join(", "))
        };

        DetectionResult::from_heuristic(confidence, details)
    }
}
