// Scam/phishing detector: hosted phishing model, falling back to a phrase
// list plus urgency patterns plus suspicious-URL checks.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex_lite::Regex;

use super::heuristic_confidence;
use super::remote::{detect_with_fallback, RemoteClassifier};
use super::traits::{DetectionResult, DetectorKind, ThreatDetector};

/// Phrases matched as substrings of the lower-cased content.
pub const SCAM_INDICATORS: &[&str] = &[
    "scam",
    "fraud",
    "phishing",
    "nigerian prince",
    "inheritance",
    "bank transfer",
    "wire money",
    "western union",
    "gift card",
    "itunes card",
    "amazon card",
    "social security",
    "irs",
    "tax refund",
    "government grant",
    "lottery",
    "sweepstakes",
    "you won",
    "claim your prize",
    "winner",
    "verify your account",
    "suspended account",
    "unusual activity",
    "confirm your identity",
    "update payment",
    "billing problem",
    "act immediately",
    "within 24 hours",
    "account will be closed",
    "click this link",
    "download attachment",
    "open pdf",
    "urgent action",
    "congratulations",
    "selected",
    "free money",
    "cash prize",
];

static URGENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)urgent",
        r"(?i)immediate(ly)?",
        r"(?i)act now",
        r"(?i)limited time",
        r"(?i)expires (soon|today|tonight)",
        r"(?i)hurry",
        r"(?i)don't (miss|wait)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("urgency pattern is valid"))
    .collect()
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("url pattern is valid"));

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("ipv4 pattern is valid")
});

const URL_SHORTENERS: &[&str] = &["bit.ly", "tinyurl"];

/// A URL is suspicious when it isn't https, goes through a shortener, or
/// points at a raw IPv4 address. Matching is on the URL as written.
pub fn is_suspicious_url(url: &str) -> bool {
    !url.contains("https")
        || URL_SHORTENERS.iter().any(|s| url.contains(s))
        || IPV4_PATTERN.is_match(url)
}

/// Every http(s) URL token in the content that looks suspicious.
pub fn suspicious_urls(content: &str) -> Vec<&str> {
    URL_PATTERN
        .find_iter(content)
        .map(|m| m.as_str())
        .filter(|url| is_suspicious_url(url))
        .collect()
}

pub struct ScamDetector {
    remote: Option<Arc<dyn RemoteClassifier>>,
}

impl ScamDetector {
    pub fn new(remote: Option<Arc<dyn RemoteClassifier>>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ThreatDetector for ScamDetector {
    fn name(&self) -> &'static str {
        "Scam Detector"
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Scam
    }

    async fn detect(&self, content: &str) -> DetectionResult {
        detect_with_fallback(self.kind(), self.remote.as_deref(), content, |c| {
            self.heuristic(c)
        })
        .await
    }

    fn heuristic(&self, content: &str) -> DetectionResult {
        let lower = content.to_lowercase();
        let keyword_matches = SCAM_INDICATORS
            .iter()
            .filter(|indicator| lower.contains(*indicator))
            .count();
        let urgency_matches = URGENCY_PATTERNS
            .iter()
            .filter(|pattern| pattern.is_match(content))
            .count();
        let url_matches = suspicious_urls(content).len();

        let total = keyword_matches + urgency_matches + url_matches;
        let confidence = heuristic_confidence(total, 20, 35);
        let details = if total > 0 {
            format!("Scam indicators: {total} red flags detected")
        } else {
            "No scam indicators".to_string()
        };

        DetectionResult::from_heuristic(confidence, details)
    }
}
