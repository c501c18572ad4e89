//! A single time-stamped observation.

use crate::precision::Precision;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One `(timestamp, value)` observation of a sensor.
///
/// Timestamps are milliseconds since the Unix epoch. A missing value marks a
/// no-data sample: the sensor reported nothing at that time, which is distinct
/// from a valid zero.
///
/// Samples are immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample<V = Decimal> {
    timestamp: i64,
    value: Option<V>,
}

impl<V: Precision> Sample<V> {
    /// Creates a sample holding a valid value.
    pub fn new(timestamp: i64, value: V) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    /// Creates a no-data sample at `timestamp`.
    pub fn no_data(timestamp: i64) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The observed value, or `None` for a no-data sample.
    pub fn value(&self) -> Option<V> {
        self.value
    }

    /// Returns true if this sample carries no value.
    pub fn is_no_data(&self) -> bool {
        self.value.is_none()
    }

    /// Returns the timestamp as a UTC date time.
    ///
    /// Returns `None` if the timestamp is outside chrono's representable range.
    #[cfg(feature = "chrono_v0_4")]
    pub fn datetime(&self) -> Option<chrono_v0_4::DateTime<chrono_v0_4::Utc>> {
        chrono_v0_4::DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl<V: Precision> From<(i64, V)> for Sample<V> {
    fn from((timestamp, value): (i64, V)) -> Self {
        Self::new(timestamp, value)
    }
}

impl<V: Precision> From<(i64, Option<V>)> for Sample<V> {
    fn from((timestamp, value): (i64, Option<V>)) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sample() {
        let sample = Sample::new(1_609_459_200_000, Decimal::new(425, 1));
        assert_eq!(sample.timestamp(), 1_609_459_200_000);
        assert_eq!(sample.value(), Some(Decimal::new(425, 1)));
        assert!(!sample.is_no_data());
    }

    #[test]
    fn test_no_data_is_not_zero() {
        let zero = Sample::new(1_000, Decimal::ZERO);
        let missing = Sample::<Decimal>::no_data(1_000);
        assert!(!zero.is_no_data());
        assert!(missing.is_no_data());
        assert_ne!(zero, missing);
    }

    #[test]
    fn test_from_tuples() {
        let a: Sample<f64> = (5, 1.5).into();
        let b: Sample<f64> = (5, None).into();
        assert_eq!(a.value(), Some(1.5));
        assert!(b.is_no_data());
    }

    #[test]
    fn test_serde_round_trip_keeps_no_data() {
        let samples = vec![Sample::new(1, 2.5f64), Sample::no_data(2)];
        let json = serde_json::to_string(&samples).unwrap();
        assert_eq!(
            json,
            r#"[{"timestamp":1,"value":2.5},{"timestamp":2,"value":null}]"#
        );
        let decoded: Vec<Sample<f64>> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, samples);
    }

    #[cfg(feature = "chrono_v0_4")]
    #[test]
    fn test_datetime() {
        let sample = Sample::new(1_609_459_200_000, Decimal::ONE);
        let dt = sample.datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "2021-01-01T00:00:00+00:00");
    }
}
