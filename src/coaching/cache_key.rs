//! Cache key construction.
//!
//! Format: `coaching:<deviceId>:<pace>:<hr|no-hr>:<distance>:<model|default>`.
//! `:` and `%` inside the device id or model selector are percent-escaped, so a
//! key splits back into exactly six fields and distinct inputs never collide.

use super::quantize::TelemetryBuckets;
use crate::types::TelemetrySample;

/// Namespace prefix for coaching entries.
pub const KEY_PREFIX: &str = "coaching";

/// Field separator. Never appears unescaped inside a field.
pub const DELIMITER: char = ':';

/// Key token for a request that did not select a model. Validation folds a
/// literal `"default"` selector into "no selector", so the token is unambiguous.
pub const DEFAULT_MODEL_TOKEN: &str = crate::types::DEFAULT_MODEL_SELECTOR;

/// Escape the delimiter and the escape character itself.
fn escape_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

/// Build the cache key for a device, bucket tuple and model selector.
pub fn build_cache_key(device_id: &str, buckets: &TelemetryBuckets, model: Option<&str>) -> String {
    let model = model.map_or_else(|| DEFAULT_MODEL_TOKEN.to_string(), escape_field);
    format!(
        "{KEY_PREFIX}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{model}",
        escape_field(device_id),
        buckets.pace,
        buckets.heart_rate,
        buckets.distance,
    )
}

/// Quantize a sample and build its key.
pub fn key_for_sample(sample: &TelemetrySample) -> String {
    let buckets =
        TelemetryBuckets::from_readings(sample.avg_pace, sample.avg_heart_rate, sample.distance);
    build_cache_key(&sample.device_id, &buckets, sample.model.as_deref())
}

/// Pattern matching every coaching key of one device.
pub fn device_key_pattern(device_id: &str) -> String {
    format!("{KEY_PREFIX}{DELIMITER}{}{DELIMITER}*", escape_field(device_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coaching::quantize::HeartRateBucket;
    use std::collections::HashSet;

    fn sample(pace: f64, hr: Option<u32>, distance: f64) -> TelemetrySample {
        TelemetrySample {
            device_id: "device-1".to_string(),
            distance,
            duration_ms: 600_000,
            avg_pace: pace,
            avg_heart_rate: hr,
            model: None,
        }
    }

    #[test]
    fn test_key_format() {
        let key = key_for_sample(&sample(318.0, Some(152), 2460.0));
        assert_eq!(key, "coaching:device-1:320:150:2500:default");
    }

    #[test]
    fn test_key_without_heart_rate() {
        let key = key_for_sample(&sample(318.0, None, 2460.0));
        assert_eq!(key, "coaching:device-1:320:no-hr:2500:default");
    }

    #[test]
    fn test_same_buckets_same_key() {
        let a = key_for_sample(&sample(301.9, Some(148), 1020.0));
        let b = key_for_sample(&sample(298.4, Some(151), 979.5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_bucket_tuples_never_collide() {
        let mut keys = HashSet::new();
        let mut tuples = 0;
        for pace in [280, 290, 300] {
            for hr in [
                HeartRateBucket::Absent,
                HeartRateBucket::Bpm(0),
                HeartRateBucket::Bpm(145),
                HeartRateBucket::Bpm(150),
            ] {
                for distance in [0, 100, 1000] {
                    let buckets = TelemetryBuckets { pace, heart_rate: hr, distance };
                    keys.insert(build_cache_key("device-1", &buckets, Some("m")));
                    tuples += 1;
                }
            }
        }
        assert_eq!(keys.len(), tuples);
    }

    #[test]
    fn test_missing_model_differs_from_empty_model() {
        let buckets = TelemetryBuckets::from_readings(300.0, None, 0.0);
        let missing = build_cache_key("d", &buckets, None);
        let empty = build_cache_key("d", &buckets, Some(""));
        assert_ne!(missing, empty);
        assert!(missing.ends_with(":default"));
        assert!(empty.ends_with(':'));
    }

    #[test]
    fn test_delimiter_in_fields_is_escaped() {
        let buckets = TelemetryBuckets::from_readings(300.0, None, 0.0);
        let key = build_cache_key("a:b", &buckets, Some("meta-llama/llama-3.2-3b-instruct:free"));
        assert_eq!(key.split(DELIMITER).count(), 6);
        assert!(key.contains("a%3Ab"));
        assert!(key.ends_with("instruct%3Afree"));

        // "a:b" vs literal "a%3Ab" must not collide.
        let literal = build_cache_key("a%3Ab", &buckets, None);
        let escaped = build_cache_key("a:b", &buckets, None);
        assert_ne!(literal, escaped);
    }

    #[test]
    fn test_device_pattern_covers_device_keys_only() {
        let pattern = device_key_pattern("device-1");
        assert_eq!(pattern, "coaching:device-1:*");
        let key = key_for_sample(&sample(300.0, None, 0.0));
        assert!(key.starts_with(pattern.trim_end_matches('*')));
        assert!(!"coaching:device-10:300:no-hr:0:default".starts_with(pattern.trim_end_matches('*')));
    }
}
