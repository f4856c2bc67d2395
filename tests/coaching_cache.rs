//! Coaching Cache Tests
//!
//! Exercises the public coaching core end to end: quantization into keys,
//! the freshness gate, and the resolver over the in-memory store.

use joggps_coach::coaching::{
    build_cache_key, key_for_sample, CachedCoachingEntry, Freshness, FreshnessPolicy,
    HeartRateBucket, StaleReason, TelemetryBuckets,
};
use joggps_coach::{
    CacheStore, CoachingService, GenerationError, GenerationInvoker, MemoryStore, MessageSource,
    PromptContext, TelemetrySample,
};

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn sample(device_id: &str, pace: f64, hr: Option<u32>, distance: f64) -> TelemetrySample {
    TelemetrySample {
        device_id: device_id.to_string(),
        distance,
        duration_ms: 600_000,
        avg_pace: pace,
        avg_heart_rate: hr,
        model: None,
    }
}

fn entry(created: i64, distance: f64) -> CachedCoachingEntry {
    CachedCoachingEntry {
        message: "Nice and steady".to_string(),
        created_at_epoch_millis: created,
        pace: 300.0,
        heart_rate: None,
        distance,
        model: None,
    }
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn readings_in_one_bucket_share_a_key() {
    let a = key_for_sample(&sample("dev", 301.0, Some(148), 1010.0));
    let b = key_for_sample(&sample("dev", 304.9, Some(152), 1049.0));
    assert_eq!(a, b);
    assert_eq!(a, "coaching:dev:300:150:1000:default");
}

#[test]
fn distinct_bucket_tuples_never_collide() {
    let mut seen = HashSet::new();
    for device in ["a", "a:b", "a%3Ab"] {
        for pace in [290, 300] {
            for hr in [HeartRateBucket::Absent, HeartRateBucket::Bpm(150)] {
                for model in [None, Some(""), Some("x:y"), Some("x%3Ay")] {
                    let buckets = TelemetryBuckets {
                        pace,
                        heart_rate: hr,
                        distance: 1000,
                    };
                    assert!(seen.insert(build_cache_key(device, &buckets, model)));
                }
            }
        }
    }
}

#[test]
fn missing_heart_rate_never_matches_a_reading() {
    let absent = key_for_sample(&sample("dev", 300.0, None, 1000.0));
    for hr in 0..=250 {
        assert_ne!(absent, key_for_sample(&sample("dev", 300.0, Some(hr), 1000.0)));
    }
}

// ============================================================================
// Freshness gate
// ============================================================================

#[test]
fn gate_examples() {
    let gate = FreshnessPolicy::default();
    let at = |d| sample("dev", 300.0, None, d);

    assert_eq!(
        gate.evaluate(&at(1000.0), None, 0),
        Freshness::Stale(StaleReason::Missing)
    );
    assert!(matches!(
        gate.evaluate(&at(1000.0), Some(&entry(0, 1000.0)), 61_000),
        Freshness::Stale(StaleReason::Expired { .. })
    ));
    assert!(gate
        .evaluate(&at(1150.0), Some(&entry(0, 1000.0)), 30_000)
        .is_fresh());
    assert!(matches!(
        gate.evaluate(&at(1201.0), Some(&entry(0, 1000.0)), 0),
        Freshness::Stale(StaleReason::MovedOn { .. })
    ));
}

// ============================================================================
// Resolver
// ============================================================================

struct CountingInvoker(AtomicUsize);

#[async_trait]
impl GenerationInvoker for CountingInvoker {
    async fn generate(
        &self,
        _sample: &TelemetrySample,
        _ctx: &PromptContext,
    ) -> Result<String, GenerationError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("Keep it up ({n})"))
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test]
async fn resolve_is_idempotent_within_window() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(CountingInvoker(AtomicUsize::new(0)));
    let svc = CoachingService::new(
        store.clone(),
        invoker.clone(),
        FreshnessPolicy::default(),
        Duration::from_secs(300),
        Duration::from_secs(5),
    );
    let s = sample("dev", 300.0, Some(150), 1000.0);
    let ctx = PromptContext::default();

    let first = svc.resolve_coaching_message(&s, &ctx).await;
    let second = svc.resolve_coaching_message(&s, &ctx).await;

    assert_eq!(first.source, MessageSource::Generated);
    assert_eq!(second.source, MessageSource::Cache);
    assert_eq!(first.message, second.message);
    assert_eq!(invoker.0.load(Ordering::SeqCst), 1);

    // Stored as a flat JSON document under the key
    let raw = store.get(&first.cache_key).await.unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["message"], first.message.as_str());
    assert_eq!(doc["distance"], 1000.0);
    assert_eq!(doc["heartRate"], 150);
    assert!(doc["timestamp"].is_i64());
}

#[tokio::test]
async fn invalidation_forces_regeneration() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(CountingInvoker(AtomicUsize::new(0)));
    let svc = CoachingService::new(
        store,
        invoker.clone(),
        FreshnessPolicy::default(),
        Duration::from_secs(300),
        Duration::from_secs(5),
    );
    let s = sample("dev", 300.0, None, 1000.0);
    let ctx = PromptContext::default();

    svc.resolve_coaching_message(&s, &ctx).await;
    assert_eq!(svc.invalidate_device("dev").await.unwrap(), 1);
    let again = svc.resolve_coaching_message(&s, &ctx).await;
    assert_eq!(again.source, MessageSource::Generated);
    assert_eq!(invoker.0.load(Ordering::SeqCst), 2);
}
