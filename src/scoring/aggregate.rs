// Aggregation: reduce four adjusted confidences to one verdict.
//
// Thresholds use strict comparison: exactly 40 is not a threat, exactly 70
// is medium.

use serde::{Deserialize, Serialize};

use crate::detectors::traits::{DetectorKind, ThreatLevel};

pub const THREAT_THRESHOLD: f64 = 40.0;
pub const HIGH_THRESHOLD: f64 = 70.0;

/// Combined verdict across all four categories (each 0.0 to 100.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateScore {
    pub spam: f64,
    pub deepfake: f64,
    pub toxicity: f64,
    pub scam: f64,
    pub overall: ThreatLevel,
    pub is_threat: bool,
}

impl AggregateScore {
    /// The largest of the four signals.
    pub fn max_score(&self) -> f64 {
        self.spam.max(self.deepfake).max(self.toxicity).max(self.scam)
    }

    pub fn score_for(&self, kind: DetectorKind) -> f64 {
        match kind {
            DetectorKind::Spam => self.spam,
            DetectorKind::Deepfake => self.deepfake,
            DetectorKind::Toxicity => self.toxicity,
            DetectorKind::Scam => self.scam,
        }
    }

    /// The category with the highest score (first wins on ties).
    pub fn dominant(&self) -> DetectorKind {
        DetectorKind::ALL
            .into_iter()
            .fold(DetectorKind::Spam, |best, kind| {
                if self.score_for(kind) > self.score_for(best) {
                    kind
                } else {
                    best
                }
            })
    }
}

/// Combine four adjusted confidences. Disabled detectors pass 0.
pub fn aggregate(spam: f64, deepfake: f64, toxicity: f64, scam: f64) -> AggregateScore {
    let max = spam.max(deepfake).max(toxicity).max(scam);
    AggregateScore {
        spam,
        deepfake,
        toxicity,
        scam,
        overall: ThreatLevel::from_cutoffs(max, HIGH_THRESHOLD, THREAT_THRESHOLD),
        is_threat: max > THREAT_THRESHOLD,
    }
}
