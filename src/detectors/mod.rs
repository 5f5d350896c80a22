// Detectors: one per threat category, all behind the ThreatDetector trait.
//
// Each detector tries an optional hosted classifier first and degrades to a
// local keyword/regex heuristic on any failure. The heuristics are the part
// that must stay exact: callers compare scores across surfaces.

pub mod deepfake;
pub mod remote;
pub mod scam;
pub mod spam;
pub mod toxicity;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use deepfake::DeepfakeDetector;
use remote::huggingface::HuggingFaceClassifier;
use remote::perspective::PerspectiveClassifier;
use remote::RemoteClassifier;
use scam::ScamDetector;
use spam::SpamDetector;
use toxicity::ToxicityDetector;
use traits::DetectorKind;

/// The full set of detectors, one per category.
///
/// Fields are concrete types rather than trait objects: the set of
/// categories is closed and the analyzer addresses each one by name.
pub struct DetectorSet {
    pub spam: SpamDetector,
    pub scam: ScamDetector,
    pub toxicity: ToxicityDetector,
    pub deepfake: DeepfakeDetector,
}

impl DetectorSet {
    /// Heuristic-only detectors. No network access at all.
    pub fn local() -> Self {
        Self {
            spam: SpamDetector::new(None),
            scam: ScamDetector::new(None),
            toxicity: ToxicityDetector::new(None),
            deepfake: DeepfakeDetector::new(None),
        }
    }

    /// Build detectors from configuration.
    ///
    /// A detector only gets a remote classifier when its API key is set;
    /// a missing key is treated the same as a failed call.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = remote::http_client(config.http_timeout)?;

        let hf = |kind: DetectorKind| -> Option<Arc<dyn RemoteClassifier>> {
            config.hugging_face_api_key.as_ref().map(|key| {
                Arc::new(HuggingFaceClassifier::for_kind(
                    client.clone(),
                    &config.hugging_face_api_url,
                    key.clone(),
                    kind,
                )) as Arc<dyn RemoteClassifier>
            })
        };

        let perspective = config.perspective_api_key.as_ref().map(|key| {
            Arc::new(PerspectiveClassifier::new(
                client.clone(),
                &config.perspective_api_url,
                key.clone(),
            )) as Arc<dyn RemoteClassifier>
        });

        Ok(Self {
            spam: SpamDetector::new(hf(DetectorKind::Spam)),
            scam: ScamDetector::new(hf(DetectorKind::Scam)),
            toxicity: ToxicityDetector::new(perspective),
            deepfake: DeepfakeDetector::new(hf(DetectorKind::Deepfake)),
        })
    }
}

/// Map a raw count onto the shared heuristic scale: `per_match` points per
/// indicator, capped at 95, with a floor once anything matched.
pub(crate) fn heuristic_confidence(matches: usize, per_match: u32, floor: u32) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    let raw = (matches as u32).saturating_mul(per_match).min(95);
    f64::from(raw.max(floor))
}
