//! Time arithmetic for stage results.
//!
//! Pure functions combining raw elapsed time with administrative
//! penalty/discount durations. No side effects, no error conditions: missing
//! components count as zero and the result is floored at zero.

use chrono::{DateTime, Utc};

use crate::models::DurationSecs;

/// Adjusted competitive time for one stage result.
///
/// `max(0, elapsed + penalty_waypoint + penalty_speed - discount_claim)`,
/// with any missing component treated as zero. A discount larger than the
/// accumulated time yields zero, never a negative duration.
pub fn adjusted_seconds(
    elapsed: DurationSecs,
    penalty_waypoint: Option<DurationSecs>,
    penalty_speed: Option<DurationSecs>,
    discount_claim: Option<DurationSecs>,
) -> DurationSecs {
    elapsed
        .add(penalty_waypoint.unwrap_or(DurationSecs::ZERO))
        .add(penalty_speed.unwrap_or(DurationSecs::ZERO))
        .saturating_sub(discount_claim.unwrap_or(DurationSecs::ZERO))
}

/// Elapsed duration between two checkpoint timestamps, floored at zero.
pub fn elapsed_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> DurationSecs {
    DurationSecs::between(earlier, later)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn secs(v: i64) -> DurationSecs {
        DurationSecs::try_new(v).unwrap()
    }

    #[test]
    fn test_adjusted_no_components() {
        assert_eq!(adjusted_seconds(secs(600), None, None, None).value(), 600);
    }

    #[test]
    fn test_adjusted_penalties_add() {
        let adjusted = adjusted_seconds(secs(600), Some(secs(60)), Some(secs(30)), None);
        assert_eq!(adjusted.value(), 690);
    }

    #[test]
    fn test_adjusted_discount_subtracts() {
        let adjusted = adjusted_seconds(secs(600), Some(secs(60)), None, Some(secs(100)));
        assert_eq!(adjusted.value(), 560);
    }

    #[test]
    fn test_adjusted_floors_at_zero() {
        let adjusted = adjusted_seconds(secs(300), None, None, Some(secs(400)));
        assert_eq!(adjusted.value(), 0);
    }

    #[test]
    fn test_adjusted_zero_elapsed_with_discount() {
        let adjusted = adjusted_seconds(DurationSecs::ZERO, None, None, Some(secs(10)));
        assert_eq!(adjusted.value(), 0);
    }

    #[test]
    fn test_elapsed_between_ordered() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 11, 40).unwrap();
        assert_eq!(elapsed_between(t0, t1).value(), 700);
    }

    #[test]
    fn test_elapsed_between_reversed_floors_at_zero() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(elapsed_between(t0, t1).value(), 0);
    }
}
