// Strictness adjustment: scale one detector's confidence by the user's
// strictness multiplier.
//
// Only `confidence` changes. `detected` and `threat_level` stay as the
// detector reported them; the aggregator is the only stage that
// re-derives severity from the adjusted numbers.

use crate::detectors::traits::DetectionResult;
use crate::steering::config::BASELINE_STRICTNESS;

/// Scale `result.confidence` by `strictness / 7`, capped at 100.
pub fn adjust(result: DetectionResult, strictness: u8) -> DetectionResult {
    let multiplier = f64::from(strictness) / f64::from(BASELINE_STRICTNESS);
    DetectionResult {
        confidence: (result.confidence * multiplier).min(100.0),
        ..result
    }
}
