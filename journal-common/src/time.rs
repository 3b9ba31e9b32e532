//! Time units for journal timestamps.
//!
//! The journal stores realtime timestamps as microseconds since the Unix
//! epoch. [`Microseconds`] keeps that resolution internally and converts to
//! and from wall-clock instants at the API edge.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp in microseconds since Unix epoch.
///
/// Used for journal entry timestamps, cutoffs and range bounds.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Microseconds(pub u64);

impl Microseconds {
    /// Get the raw microseconds value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Convert to a UTC wall-clock instant.
    ///
    /// Values beyond chrono's representable range clamp to its maximum.
    pub fn to_datetime(self) -> DateTime<Utc> {
        i64::try_from(self.0)
            .ok()
            .and_then(DateTime::from_timestamp_micros)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Convert to a wall-clock instant presented at a fixed offset.
    pub fn to_datetime_with_offset(self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.to_datetime().with_timezone(&offset)
    }

    /// Build a timestamp from a wall-clock instant.
    ///
    /// Instants before the epoch clamp to zero; sub-microsecond precision is
    /// truncated.
    pub fn from_datetime<Tz: chrono::TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(u64::try_from(instant.timestamp_micros()).unwrap_or(0))
    }
}

impl From<u64> for Microseconds {
    fn from(us: u64) -> Self {
        Microseconds(us)
    }
}

impl From<DateTime<Utc>> for Microseconds {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(&instant)
    }
}

impl From<DateTime<FixedOffset>> for Microseconds {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::from_datetime(&instant)
    }
}

impl From<Microseconds> for DateTime<Utc> {
    fn from(us: Microseconds) -> Self {
        us.to_datetime()
    }
}

impl std::fmt::Display for Microseconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}µs", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn datetime_conversion_keeps_microseconds() {
        let instant = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
            + chrono::Duration::microseconds(42);
        let ts = Microseconds::from(instant);
        assert_eq!(ts.get() % 1_000_000, 42);
        assert_eq!(ts.to_datetime(), instant);
    }

    #[test]
    fn pre_epoch_instants_clamp_to_zero() {
        let instant = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Microseconds::from(instant), Microseconds(0));
    }

    #[test]
    fn out_of_range_values_clamp_to_max() {
        assert_eq!(Microseconds(u64::MAX).to_datetime(), DateTime::<Utc>::MAX_UTC);
    }
}
