use serde::{Deserialize, Serialize};

/// Non-negative wall-clock duration in whole seconds.
///
/// All durations crossing the engine boundary (penalties, discounts, elapsed
/// and adjusted times) use this encoding. Serializes as a bare integer;
/// negative values are rejected at construction and deserialization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct DurationSecs(i64);

/// Error raised when a negative second count is supplied.
#[derive(Debug, Clone, thiserror::Error)]
#[error("duration must be non-negative, got {0} seconds")]
pub struct NegativeDuration(pub i64);

impl DurationSecs {
    pub const ZERO: DurationSecs = DurationSecs(0);

    /// Create from a second count, rejecting negatives.
    pub fn try_new(secs: i64) -> Result<Self, NegativeDuration> {
        if secs < 0 {
            Err(NegativeDuration(secs))
        } else {
            Ok(Self(secs))
        }
    }

    /// Raw second count.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Sum of two durations.
    pub fn add(self, other: DurationSecs) -> DurationSecs {
        DurationSecs(self.0.saturating_add(other.0))
    }

    /// Difference of two durations, floored at zero.
    pub fn saturating_sub(self, other: DurationSecs) -> DurationSecs {
        DurationSecs((self.0 - other.0).max(0))
    }

    /// Interval between two instants, floored at zero.
    ///
    /// A `later` before `earlier` is an upstream data error; the result is
    /// still a valid (zero) duration rather than a negative value.
    pub fn between(
        earlier: chrono::DateTime<chrono::Utc>,
        later: chrono::DateTime<chrono::Utc>,
    ) -> DurationSecs {
        DurationSecs((later - earlier).num_seconds().max(0))
    }

    /// Convert to a chrono duration.
    pub fn to_chrono(self) -> chrono::Duration {
        chrono::Duration::seconds(self.0)
    }
}

impl TryFrom<i64> for DurationSecs {
    type Error = NegativeDuration;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        DurationSecs::try_new(secs)
    }
}

impl From<DurationSecs> for i64 {
    fn from(d: DurationSecs) -> Self {
        d.0
    }
}

impl std::fmt::Display for DurationSecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::DurationSecs;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_try_new_rejects_negative() {
        assert!(DurationSecs::try_new(-1).is_err());
        assert!(DurationSecs::try_new(0).is_ok());
        assert!(DurationSecs::try_new(3600).is_ok());
    }

    #[test]
    fn test_value() {
        let d = DurationSecs::try_new(600).unwrap();
        assert_eq!(d.value(), 600);
    }

    #[test]
    fn test_add() {
        let a = DurationSecs::try_new(600).unwrap();
        let b = DurationSecs::try_new(60).unwrap();
        assert_eq!(a.add(b).value(), 660);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = DurationSecs::try_new(300).unwrap();
        let b = DurationSecs::try_new(400).unwrap();
        assert_eq!(a.saturating_sub(b).value(), 0);
        assert_eq!(b.saturating_sub(a).value(), 100);
    }

    #[test]
    fn test_between() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 10, 0).unwrap();
        assert_eq!(DurationSecs::between(t0, t1).value(), 600);
    }

    #[test]
    fn test_between_reversed_is_zero() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 10, 0).unwrap();
        assert_eq!(DurationSecs::between(t1, t0).value(), 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = DurationSecs::try_new(45).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "45");
        let back: DurationSecs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_serde_rejects_negative() {
        let result: Result<DurationSecs, _> = serde_json::from_str("-30");
        assert!(result.is_err());
    }

    #[test]
    fn test_ordering() {
        let a = DurationSecs::try_new(100).unwrap();
        let b = DurationSecs::try_new(200).unwrap();
        assert!(a < b);
    }
}
