// Analyzer: one scoring operation end to end.
//
// Takes a config snapshot once, runs every enabled detector concurrently,
// applies strictness to each result, and aggregates. A slow or failing
// remote call only affects its own detector.

use futures::join;
use serde::Serialize;
use tracing::debug;

use super::aggregate::{aggregate, AggregateScore};
use super::strictness;
use crate::detectors::traits::{DetectionResult, DetectorKind, ThreatDetector};
use crate::detectors::DetectorSet;
use crate::steering::SteeringConfig;

/// Per-detector adjusted results plus the aggregate verdict.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub spam: DetectionResult,
    pub deepfake: DetectionResult,
    pub toxicity: DetectionResult,
    pub scam: DetectionResult,
    pub score: AggregateScore,
}

impl Analysis {
    pub fn result_for(&self, kind: DetectorKind) -> &DetectionResult {
        match kind {
            DetectorKind::Spam => &self.spam,
            DetectorKind::Deepfake => &self.deepfake,
            DetectorKind::Toxicity => &self.toxicity,
            DetectorKind::Scam => &self.scam,
        }
    }
}

pub struct Analyzer {
    detectors: DetectorSet,
}

impl Analyzer {
    pub fn new(detectors: DetectorSet) -> Self {
        Self { detectors }
    }

    /// Score one content item under `config`.
    ///
    /// Callers are expected to skip empty or whitespace-only content.
    pub async fn analyze(&self, content: &str, config: &SteeringConfig) -> Analysis {
        let d = &self.detectors;
        let (spam, deepfake, toxicity, scam) = join!(
            run_detector(&d.spam, content, config),
            run_detector(&d.deepfake, content, config),
            run_detector(&d.toxicity, content, config),
            run_detector(&d.scam, content, config),
        );

        let score = aggregate(
            spam.confidence,
            deepfake.confidence,
            toxicity.confidence,
            scam.confidence,
        );

        debug!(
            spam = score.spam,
            deepfake = score.deepfake,
            toxicity = score.toxicity,
            scam = score.scam,
            overall = %score.overall,
            "Content analyzed"
        );

        Analysis {
            spam,
            deepfake,
            toxicity,
            scam,
            score,
        }
    }
}

/// Run one detector if it is enabled; disabled detectors contribute zero.
async fn run_detector(
    detector: &dyn ThreatDetector,
    content: &str,
    config: &SteeringConfig,
) -> DetectionResult {
    if !config.is_agent_active(detector.kind()) {
        debug!(detector = detector.name(), "Detector disabled, skipping");
        return DetectionResult::inactive();
    }
    let raw = detector.detect(content).await;
    debug!(
        detector = detector.name(),
        confidence = raw.confidence,
        "Raw detection"
    );
    strictness::adjust(raw, config.detection_strictness)
}
