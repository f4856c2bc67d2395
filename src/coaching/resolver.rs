//! Cache-or-generate resolution for one coaching tick.
//!
//! quantize -> key -> store lookup -> freshness gate -> reuse, or
//! generate (bounded) -> store write. Neither a store outage nor an
//! upstream failure reaches the caller: the first degrades to a cache miss,
//! the second to a fallback message.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::cache_key::{device_key_pattern, key_for_sample};
use super::fallback::fallback_message;
use super::freshness::{CachedCoachingEntry, Freshness, FreshnessPolicy};
use crate::cache::{delete_matching, get_json, set_json, CacheError, CacheStore};
use crate::config::CoachConfig;
use crate::llm::{GenerationError, GenerationInvoker};
use crate::types::{PromptContext, TelemetrySample};

/// Where the returned message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Cache,
    Generated,
    Fallback,
}

/// Result of resolving one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachingOutcome {
    pub message: String,
    pub was_cached: bool,
    pub source: MessageSource,
    pub cache_key: String,
}

/// Coaching cache in front of the generation invoker
pub struct CoachingService {
    store: Arc<dyn CacheStore>,
    invoker: Arc<dyn GenerationInvoker>,
    policy: FreshnessPolicy,
    store_ttl: Duration,
    generation_timeout: Duration,
}

impl CoachingService {
    pub fn new(
        store: Arc<dyn CacheStore>,
        invoker: Arc<dyn GenerationInvoker>,
        policy: FreshnessPolicy,
        store_ttl: Duration,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            store,
            invoker,
            policy,
            store_ttl,
            generation_timeout,
        }
    }

    /// Service with thresholds taken from config.
    pub fn from_config(
        config: &CoachConfig,
        store: Arc<dyn CacheStore>,
        invoker: Arc<dyn GenerationInvoker>,
    ) -> Self {
        Self::new(
            store,
            invoker,
            config.freshness_policy(),
            config.store_ttl(),
            config.generation_timeout(),
        )
    }

    /// Resolve a coaching message for `sample` at the current wall-clock time.
    pub async fn resolve_coaching_message(
        &self,
        sample: &TelemetrySample,
        ctx: &PromptContext,
    ) -> CoachingOutcome {
        self.resolve_at(sample, ctx, Utc::now().timestamp_millis()).await
    }

    /// Resolve at an explicit `now_ms`. Entries written here carry `now_ms`
    /// as their creation time.
    pub async fn resolve_at(
        &self,
        sample: &TelemetrySample,
        ctx: &PromptContext,
        now_ms: i64,
    ) -> CoachingOutcome {
        let cache_key = key_for_sample(sample);

        let entry = match get_json::<CachedCoachingEntry>(self.store.as_ref(), &cache_key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Coaching cache read failed, treating as miss");
                None
            }
        };

        match (self.policy.evaluate(sample, entry.as_ref(), now_ms), entry) {
            (Freshness::Fresh, Some(entry)) => {
                debug!(key = %cache_key, "Coaching cache hit");
                return CoachingOutcome {
                    message: entry.message,
                    was_cached: true,
                    source: MessageSource::Cache,
                    cache_key,
                };
            }
            (Freshness::Stale(reason), _) => {
                debug!(key = %cache_key, reason = ?reason, "Coaching cache stale");
            }
            (Freshness::Fresh, None) => {}
        }

        match self.generate_bounded(sample, ctx).await {
            Ok(message) => {
                let entry = CachedCoachingEntry::for_sample(message.clone(), sample, now_ms);
                if let Err(e) =
                    set_json(self.store.as_ref(), &cache_key, &entry, self.store_ttl).await
                {
                    warn!(key = %cache_key, error = %e, "Coaching cache write failed");
                }
                CoachingOutcome {
                    message,
                    was_cached: false,
                    source: MessageSource::Generated,
                    cache_key,
                }
            }
            Err(e) => {
                warn!(
                    device_id = %sample.device_id,
                    backend = self.invoker.backend_name(),
                    error = %e,
                    "Coaching generation failed, using fallback"
                );
                CoachingOutcome {
                    message: fallback_message(sample.distance).to_string(),
                    was_cached: false,
                    source: MessageSource::Fallback,
                    cache_key,
                }
            }
        }
    }

    async fn generate_bounded(
        &self,
        sample: &TelemetrySample,
        ctx: &PromptContext,
    ) -> Result<String, GenerationError> {
        tokio::time::timeout(self.generation_timeout, self.invoker.generate(sample, ctx))
            .await
            .map_err(|_| GenerationError::Timeout(self.generation_timeout))?
    }

    /// Drop every coaching entry for a device, returning the number removed.
    pub async fn invalidate_device(&self, device_id: &str) -> Result<u64, CacheError> {
        let removed = delete_matching(self.store.as_ref(), &device_key_pattern(device_id)).await?;
        info!(device_id = %device_id, removed, "Invalidated coaching cache");
        Ok(removed)
    }
}
