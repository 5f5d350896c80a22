// Hosted classifiers: the optional first stage of every detector.
//
// A RemoteClassifier returns a probability in [0, 1] for its category.
// detect_with_fallback is the only place a remote error is swallowed: the
// error is logged and the detector's heuristic answers instead. No retries.

pub mod huggingface;
pub mod perspective;
pub mod rate_limiter;

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::traits::{DetectionResult, DetectorKind, ThreatLevel};

/// A hosted text classifier for one threat category.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Probability (0.0 to 1.0) that the text belongs to the category.
    async fn classify(&self, text: &str) -> Result<f64>;
}

/// Per-detector thresholds and wording for remote verdicts.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCutoffs {
    pub high: f64,
    pub medium: f64,
    pub high_details: &'static str,
    pub medium_details: &'static str,
    pub low_details: &'static str,
}

impl RemoteCutoffs {
    pub fn for_kind(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::Spam => Self {
                high: 70.0,
                medium: 50.0,
                high_details: "High spam probability",
                medium_details: "Moderate spam indicators",
                low_details: "Low spam risk",
            },
            DetectorKind::Scam => Self {
                high: 70.0,
                medium: 45.0,
                high_details: "High scam probability",
                medium_details: "Moderate scam indicators",
                low_details: "Low scam risk",
            },
            DetectorKind::Toxicity => Self {
                high: 75.0,
                medium: 50.0,
                high_details: "Severe toxicity detected",
                medium_details: "Moderate toxicity",
                low_details: "Low toxicity",
            },
            DetectorKind::Deepfake => Self {
                high: 70.0,
                medium: 50.0,
                high_details: "Likely synthetic content",
                medium_details: "Possible synthetic content",
                low_details: "Likely authentic content",
            },
        }
    }

    /// Turn a classifier probability into a verdict.
    pub fn verdict(&self, probability: f64) -> DetectionResult {
        let confidence = (probability.clamp(0.0, 1.0) * 100.0).round();
        let threat_level = ThreatLevel::from_cutoffs(confidence, self.high, self.medium);
        let details = match threat_level {
            ThreatLevel::High => self.high_details,
            ThreatLevel::Medium => self.medium_details,
            ThreatLevel::Low => self.low_details,
        };
        DetectionResult {
            detected: confidence > self.medium,
            confidence,
            details: Some(details.to_string()),
            threat_level,
        }
    }
}

/// Try the remote classifier, else compute the heuristic.
///
/// `remote` is `None` when no credential is configured; that path never
/// touches the network.
pub async fn detect_with_fallback<F>(
    kind: DetectorKind,
    remote: Option<&dyn RemoteClassifier>,
    content: &str,
    heuristic: F,
) -> DetectionResult
where
    F: FnOnce(&str) -> DetectionResult,
{
    if let Some(classifier) = remote {
        match classifier.classify(content).await {
            Ok(probability) => {
                let result = RemoteCutoffs::for_kind(kind).verdict(probability);
                debug!(
                    detector = kind.as_str(),
                    confidence = result.confidence,
                    "Remote classifier verdict"
                );
                return result;
            }
            Err(e) => {
                warn!(
                    detector = kind.as_str(),
                    error = %e,
                    "Remote classifier failed, using local heuristic"
                );
            }
        }
    }

    let result = heuristic(content);
    debug!(
        detector = kind.as_str(),
        confidence = result.confidence,
        "Heuristic verdict"
    );
    result
}

/// Shared HTTP client for every hosted classifier.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("trust-guardian/0.1 (content-threat-scoring)")
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(f64);

    #[async_trait]
    impl RemoteClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl RemoteClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<f64> {
            anyhow::bail!("classifier returned 500 Internal Server Error")
        }
    }

    fn marker(_: &str) -> DetectionResult {
        DetectionResult::from_heuristic(35.0, "heuristic".to_string())
    }

    #[tokio::test]
    async fn remote_success_uses_kind_cutoffs() {
        let remote = FixedClassifier(0.48);
        let result =
            detect_with_fallback(DetectorKind::Scam, Some(&remote), "text", marker).await;
        // 48 > 45 for scam, but would be low for spam (> 50)
        assert_eq!(result.confidence, 48.0);
        assert!(result.detected);
        assert_eq!(result.threat_level, ThreatLevel::Medium);

        let result =
            detect_with_fallback(DetectorKind::Spam, Some(&remote), "text", marker).await;
        assert!(!result.detected);
        assert_eq!(result.threat_level, ThreatLevel::Low);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_heuristic() {
        let result =
            detect_with_fallback(DetectorKind::Spam, Some(&FailingClassifier), "text", marker)
                .await;
        assert_eq!(result.details.as_deref(), Some("heuristic"));
        assert_eq!(result.confidence, 35.0);
    }

    #[tokio::test]
    async fn missing_remote_uses_heuristic() {
        let result = detect_with_fallback(DetectorKind::Toxicity, None, "text", marker).await;
        assert_eq!(result.details.as_deref(), Some("heuristic"));
    }

    #[test]
    fn toxicity_verdict_boundaries() {
        let cutoffs = RemoteCutoffs::for_kind(DetectorKind::Toxicity);
        assert_eq!(cutoffs.verdict(0.75).threat_level, ThreatLevel::Medium);
        assert_eq!(cutoffs.verdict(0.76).threat_level, ThreatLevel::High);
        assert!(!cutoffs.verdict(0.50).detected);
        assert_eq!(cutoffs.verdict(0.504).confidence, 50.0);
    }
}
