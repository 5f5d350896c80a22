// Detector trait and the result type every detector produces.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Three-bucket severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    /// Bucket a 0-100 confidence with strict `>` cutoffs.
    pub fn from_cutoffs(confidence: f64, high: f64, medium: f64) -> Self {
        if confidence > high {
            ThreatLevel::High
        } else if confidence > medium {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        }
    }

    /// Parse the lowercase form stored in the history table.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(ThreatLevel::Low),
            "medium" => Some(ThreatLevel::Medium),
            "high" => Some(ThreatLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detector's verdict for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected: bool,
    /// 0.0 to 100.0
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub threat_level: ThreatLevel,
}

impl DetectionResult {
    /// The result a disabled detector contributes.
    pub fn inactive() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            details: None,
            threat_level: ThreatLevel::Low,
        }
    }

    /// Build a heuristic verdict: detected above 30, high above 70.
    pub fn from_heuristic(confidence: f64, details: String) -> Self {
        Self {
            detected: confidence > 30.0,
            confidence,
            details: Some(details),
            threat_level: ThreatLevel::from_cutoffs(confidence, 70.0, 30.0),
        }
    }
}

/// The closed set of threat categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Spam,
    Scam,
    Toxicity,
    Deepfake,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 4] = [
        DetectorKind::Spam,
        DetectorKind::Deepfake,
        DetectorKind::Toxicity,
        DetectorKind::Scam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Spam => "spam",
            DetectorKind::Scam => "scam",
            DetectorKind::Toxicity => "toxicity",
            DetectorKind::Deepfake => "deepfake",
        }
    }

    /// Key of this detector's toggle in the steering config.
    pub fn agent_key(&self) -> &'static str {
        match self {
            DetectorKind::Spam => "spam_detector",
            DetectorKind::Scam => "scam_detector",
            DetectorKind::Toxicity => "toxicity_detector",
            DetectorKind::Deepfake => "deepfake_detector",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spam" | "spam_detector" => Some(DetectorKind::Spam),
            "scam" | "scam_detector" => Some(DetectorKind::Scam),
            "toxicity" | "toxicity_detector" => Some(DetectorKind::Toxicity),
            "deepfake" | "deepfake_detector" => Some(DetectorKind::Deepfake),
            _ => None,
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stateless capability mapping content to a verdict for one category.
///
/// `detect` never fails: remote errors degrade to the local heuristic
/// inside the implementation, so callers always get a score.
#[async_trait]
pub trait ThreatDetector: Send + Sync {
    /// Human-readable detector name.
    fn name(&self) -> &'static str;

    fn kind(&self) -> DetectorKind;

    /// Score content, trying the remote classifier first if one is set.
    async fn detect(&self, content: &str) -> DetectionResult;

    /// The local heuristic on its own. Pure and synchronous.
    fn heuristic(&self, content: &str) -> DetectionResult;
}
