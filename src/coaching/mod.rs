//! Coaching cache core
//!
//! Decides, for each telemetry tick, whether a previously generated coaching
//! message can be replayed or a new one must be generated.
//!
//! - `quantize`: bucket raw readings so nearby samples share a key
//! - `cache_key`: deterministic, injective key construction
//! - `freshness`: age and distance gate over a stored entry
//! - `fallback`: canned messages when generation fails
//! - `resolver`: the cache-or-generate flow over a `CacheStore`

pub mod cache_key;
pub mod fallback;
pub mod freshness;
pub mod quantize;
mod resolver;

pub use cache_key::{build_cache_key, device_key_pattern, key_for_sample};
pub use fallback::fallback_message;
pub use freshness::{CachedCoachingEntry, Freshness, FreshnessPolicy, StaleReason};
pub use quantize::{quantize, HeartRateBucket, TelemetryBuckets};
pub use resolver::{CoachingOutcome, CoachingService, MessageSource};
