//! Freshness gate: decides whether a cached coaching message may be replayed.
//!
//! Two samples landing on the same key can still be different moments of a
//! run (same pace two kilometres later), so a hit on the key alone is not
//! enough. The gate checks, in order:
//!
//! 1. an entry exists
//! 2. the entry is no older than the freshness window
//! 3. the runner has covered less than the minimum distance since the entry
//!
//! Anything else is STALE and the caller regenerates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::defaults::{FRESHNESS_WINDOW_SECS, MIN_DISTANCE_BETWEEN_MESSAGES_M};
use crate::types::TelemetrySample;

/// Stored coaching message plus the readings it was generated for.
///
/// Serialized as a flat JSON object under the cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCoachingEntry {
    pub message: String,
    #[serde(rename = "timestamp")]
    pub created_at_epoch_millis: i64,
    pub pace: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    pub distance: f64,
    #[serde(default, rename = "modelApiValue", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CachedCoachingEntry {
    /// Snapshot a freshly generated message for `sample` at `now_ms`.
    pub fn for_sample(message: String, sample: &TelemetrySample, now_ms: i64) -> Self {
        Self {
            message,
            created_at_epoch_millis: now_ms,
            pace: sample.avg_pace,
            heart_rate: sample.avg_heart_rate,
            distance: sample.distance,
            model: sample.model.clone(),
        }
    }
}

/// Gate thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessPolicy {
    /// Maximum entry age
    pub window: Duration,
    /// Distance at or beyond which the entry is replaced (meters)
    pub min_distance_meters: f64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(FRESHNESS_WINDOW_SECS),
            min_distance_meters: MIN_DISTANCE_BETWEEN_MESSAGES_M,
        }
    }
}

/// Why a lookup must regenerate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaleReason {
    /// Nothing stored under the key (or the store was unreachable)
    Missing,
    /// Entry is older than the window
    Expired { age_ms: i64 },
    /// Runner has moved on since the entry was written
    MovedOn { distance_delta: f64 },
}

/// Gate outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

impl FreshnessPolicy {
    /// Evaluate `entry` against the current sample at wall-clock `now_ms`.
    ///
    /// An entry from the future (clock skew between writers) counts as age 0.
    pub fn evaluate(
        &self,
        sample: &TelemetrySample,
        entry: Option<&CachedCoachingEntry>,
        now_ms: i64,
    ) -> Freshness {
        let Some(entry) = entry else {
            return Freshness::Stale(StaleReason::Missing);
        };

        let age_ms = now_ms.saturating_sub(entry.created_at_epoch_millis);
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);
        if age_ms > window_ms {
            return Freshness::Stale(StaleReason::Expired { age_ms });
        }

        let distance_delta = (sample.distance - entry.distance).abs();
        if distance_delta.is_nan() || distance_delta >= self.min_distance_meters {
            return Freshness::Stale(StaleReason::MovedOn { distance_delta });
        }

        Freshness::Fresh
    }
}
