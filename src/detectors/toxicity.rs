// Toxicity detector: Perspective API, falling back to seven pattern groups.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex_lite::Regex;

use super::heuristic_confidence;
use super::remote::{detect_with_fallback, RemoteClassifier};
use super::traits::{DetectionResult, DetectorKind, ThreatDetector};

// Each group counts once no matter how many hits it has. The last two are
// case-sensitive on purpose: shouting is a signal.
static TOXIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(hate|stupid|idiot|dumb|moron|loser|fool|jerk)\b",
        r"(?i)\b(kill|die|death|hurt|harm|murder|destroy)\b",
        r"(?i)\b(racist|sexist|bigot|nazi|fascist)\b",
        r"(?i)\b(fuck|shit|damn|hell|ass|bitch)\b",
        r"(?i)\b(ugly|disgusting|pathetic|worthless|useless)\b",
        r"!{3,}",
        r"[A-Z]{10,}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("toxicity pattern is valid"))
    .collect()
});

pub struct ToxicityDetector {
    remote: Option<Arc<dyn RemoteClassifier>>,
}

impl ToxicityDetector {
    pub fn new(remote: Option<Arc<dyn RemoteClassifier>>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ThreatDetector for ToxicityDetector {
    fn name(&self) -> &'static str {
        "Toxicity Detector"
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Toxicity
    }

    async fn detect(&self, content: &str) -> DetectionResult {
        detect_with_fallback(self.kind(), self.remote.as_deref(), content, |c| {
            self.heuristic(c)
        })
        .await
    }

    fn heuristic(&self, content: &str) -> DetectionResult {
        let matches = TOXIC_PATTERNS
            .iter()
            .filter(|pattern| pattern.is_match(content))
            .count();

        let confidence = heuristic_confidence(matches, 25, 40);
        let details = if matches > 0 {
            format!("Toxic patterns detected: {matches} indicators")
        } else {
            "No toxicity detected".to_string()
        };

        DetectionResult::from_heuristic(confidence, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::traits::ThreatLevel;

    fn score(text: &str) -> DetectionResult {
        ToxicityDetector::new(None).heuristic(text)
    }

    #[test]
    fn polite_text_scores_zero() {
        let result = score("Thanks for the thoughtful review, I'll update the draft");
        assert_eq!(result.confidence, 0.0);
        assert!(!result.detected);
        assert_eq!(result.details.as_deref(), Some("No toxicity detected"));
    }

    #[test]
    fn single_group_is_floored_to_40() {
        let result = score("that was a stupid idea");
        assert_eq!(result.confidence, 40.0);
        assert!(result.detected);
        assert_eq!(result.threat_level, ThreatLevel::Medium);
    }

    #[test]
    fn words_match_on_boundaries_only() {
        // "skill" and "hello" contain "kill" and "hell" but not as words
        assert_eq!(score("great skill, hello there").confidence, 0.0);
    }

    #[test]
    fn punctuation_and_caps_count_as_groups() {
        assert_eq!(score("no way!!!").confidence, 40.0);
        assert_eq!(score("ABSOLUTELYNOT").confidence, 40.0);
        // lowercase run is not shouting
        assert_eq!(score("absolutelynot").confidence, 0.0);
    }

    #[test]
    fn several_groups_reach_high() {
        // insult ("loser", not "idiotic"), violence, profanity, exclamation, caps
        let result = score("You IDIOTIC LOSER, I hope you die, damn you!!! STOPTALKINGNOW");
        assert_eq!(result.details.as_deref(), Some("Toxic patterns detected: 5 indicators"));
        assert_eq!(result.confidence, 95.0);
        assert_eq!(result.threat_level, ThreatLevel::High);
    }
}
