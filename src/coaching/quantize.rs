//! Telemetry quantization.
//!
//! Snaps continuous readings onto a coarse grid so that jitter between
//! consecutive ticks does not change the cache key.

use std::fmt;

use crate::config::defaults::{
    DISTANCE_BUCKET_METERS, HEART_RATE_BUCKET_BPM, PACE_BUCKET_SECS_PER_KM,
};

/// Round `value` to the nearest multiple of `bucket_size`.
///
/// Halves round away from zero. Out-of-range values saturate at the `i64`
/// limits; request validation bounds readings well below that.
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(value: f64, bucket_size: u32) -> i64 {
    let size = bucket_size.max(1);
    ((value / f64::from(size)).round() as i64).saturating_mul(i64::from(size))
}

/// Heart-rate bucket, or the sentinel for "no sensor"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeartRateBucket {
    Bpm(i64),
    Absent,
}

impl HeartRateBucket {
    /// Key token for a missing heart rate. Not a number, so it can never
    /// equal a rounded reading.
    pub const ABSENT_TOKEN: &'static str = "no-hr";
}

impl fmt::Display for HeartRateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bpm(v) => write!(f, "{v}"),
            Self::Absent => f.write_str(Self::ABSENT_TOKEN),
        }
    }
}

/// Quantized view of one telemetry sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TelemetryBuckets {
    pub pace: i64,
    pub heart_rate: HeartRateBucket,
    pub distance: i64,
}

impl TelemetryBuckets {
    /// Bucket pace (10 s/km), heart rate (5 bpm) and distance (100 m).
    pub fn from_readings(pace: f64, heart_rate: Option<u32>, distance: f64) -> Self {
        Self {
            pace: quantize(pace, PACE_BUCKET_SECS_PER_KM),
            heart_rate: heart_rate.map_or(HeartRateBucket::Absent, |hr| {
                HeartRateBucket::Bpm(quantize(f64::from(hr), HEART_RATE_BUCKET_BPM))
            }),
            distance: quantize(distance, DISTANCE_BUCKET_METERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_rounds_to_nearest_bucket() {
        assert_eq!(quantize(314.0, 10), 310);
        assert_eq!(quantize(315.0, 10), 320);
        assert_eq!(quantize(149.0, 5), 150);
        assert_eq!(quantize(1249.9, 100), 1200);
        assert_eq!(quantize(1250.0, 100), 1300);
    }

    #[test]
    fn test_quantize_zero_distance() {
        assert_eq!(quantize(0.0, 100), 0);
        assert_eq!(quantize(49.0, 100), 0);
    }

    #[test]
    fn test_quantize_saturates_instead_of_overflowing() {
        assert_eq!(quantize(1e300, 100), i64::MAX);
        assert_eq!(quantize(-1e300, 100), i64::MIN);
        assert_eq!(quantize(f64::NAN, 10), 0);
    }

    #[test]
    fn test_jitter_within_bucket_is_stable() {
        let a = TelemetryBuckets::from_readings(300.2, Some(151), 1004.3);
        let b = TelemetryBuckets::from_readings(299.7, Some(152), 996.1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_absent_heart_rate_token_is_not_numeric() {
        assert!(HeartRateBucket::ABSENT_TOKEN.parse::<i64>().is_err());
        assert_eq!(HeartRateBucket::Absent.to_string(), "no-hr");
        assert_eq!(HeartRateBucket::Bpm(0).to_string(), "0");
    }
}
