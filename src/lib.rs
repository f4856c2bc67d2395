//! JogGPS Coach: AI coaching relay for the JogGPS running app
//!
//! Receives live run telemetry from the phone and answers with a short
//! coaching message, replaying a recent message when the runner's state has
//! not meaningfully changed.
//!
//! ## Architecture
//!
//! - **Coaching**: quantizer, cache-key builder, freshness gate, resolver
//! - **Cache**: pluggable key-value store (Redis or in-memory)
//! - **LLM Module**: OpenRouter generation invoker and prompt templates
//! - **API**: axum HTTP surface (coaching, profile, runs, health)

pub mod api;
pub mod cache;
pub mod coaching;
pub mod config;
pub mod llm;
pub mod types;

// Re-export configuration
pub use config::CoachConfig;

// Re-export the coaching core
pub use coaching::{
    build_cache_key, CachedCoachingEntry, CoachingOutcome, CoachingService, Freshness,
    FreshnessPolicy, MessageSource,
};

// Re-export store and invoker seams
pub use cache::{CacheError, CacheStore, MemoryStore, RedisStore};
pub use llm::{GenerationError, GenerationInvoker, OpenRouterClient};

// Re-export commonly used types
pub use types::{CoachingRequest, PromptContext, TelemetrySample, ValidationError};
