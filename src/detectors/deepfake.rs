// Deepfake detector: hosted AI-text detector, falling back to patterns that
// talk about synthetic or manipulated media.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex_lite::Regex;

use super::heuristic_confidence;
use super::remote::{detect_with_fallback, RemoteClassifier};
use super::traits::{DetectionResult, DetectorKind, ThreatDetector};

static SYNTHETIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)deepfake",
        r"(?i)ai.*generated",
        r"(?i)synthetic.*media",
        r"(?i)manipulated.*image",
        r"(?i)fake.*video",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("deepfake pattern is valid"))
    .collect()
});

pub struct DeepfakeDetector {
    remote: Option<Arc<dyn RemoteClassifier>>,
}

impl DeepfakeDetector {
    pub fn new(remote: Option<Arc<dyn RemoteClassifier>>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ThreatDetector for DeepfakeDetector {
    fn name(&self) -> &'static str {
        "Deepfake Detector"
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Deepfake
    }

    async fn detect(&self, content: &str) -> DetectionResult {
        detect_with_fallback(self.kind(), self.remote.as_deref(), content, |c| {
            self.heuristic(c)
        })
        .await
    }

    fn heuristic(&self, content: &str) -> DetectionResult {
        let matches = SYNTHETIC_PATTERNS
            .iter()
            .filter(|pattern| pattern.is_match(content))
            .count();

        let confidence = heuristic_confidence(matches, 25, 40);
        let details = if matches > 0 {
            format!("Synthetic media indicators: {matches} found")
        } else {
            "No synthetic media indicators".to_string()
        };

        DetectionResult::from_heuristic(confidence, details)
    }
}
