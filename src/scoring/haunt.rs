// Haunt level: a 0-5 severity badge for one analysis.
//
// Counts how many categories fired at all and how strong the strongest one
// was. Stored with each history row so lists can sort and color by it.

use super::aggregate::AggregateScore;
use crate::detectors::traits::DetectorKind;

/// 0 when nothing fired, otherwise 1 (faint) to 5 (fully haunted).
pub fn haunt_level(score: &AggregateScore) -> u8 {
    let fired = DetectorKind::ALL
        .iter()
        .filter(|kind| score.score_for(**kind) > 0.0)
        .count();
    if fired == 0 {
        return 0;
    }

    let max = score.max_score();
    match (max, fired) {
        (m, n) if m >= 90.0 || n >= 3 => 5,
        (m, n) if m >= 75.0 || n >= 2 => 4,
        (m, _) if m >= 60.0 => 3,
        (m, _) if m >= 40.0 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::aggregate::aggregate;

    #[test]
    fn nothing_fired_is_zero() {
        assert_eq!(haunt_level(&aggregate(0.0, 0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn single_weak_signal_is_one() {
        assert_eq!(haunt_level(&aggregate(35.0, 0.0, 0.0, 0.0)), 1);
    }

    #[test]
    fn single_signal_buckets_by_strength() {
        assert_eq!(haunt_level(&aggregate(40.0, 0.0, 0.0, 0.0)), 2);
        assert_eq!(haunt_level(&aggregate(0.0, 60.0, 0.0, 0.0)), 3);
        assert_eq!(haunt_level(&aggregate(0.0, 0.0, 75.0, 0.0)), 4);
        assert_eq!(haunt_level(&aggregate(0.0, 0.0, 0.0, 95.0)), 5);
    }

    #[test]
    fn breadth_raises_the_level() {
        assert_eq!(haunt_level(&aggregate(35.0, 0.0, 40.0, 0.0)), 4);
        assert_eq!(haunt_level(&aggregate(35.0, 0.0, 40.0, 35.0)), 5);
    }
}
