//! System-wide default constants.
//!
//! Centralises the numbers that shape coaching cadence and storage lifetimes.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Quantization
// ============================================================================

/// Pace bucket width (seconds per km).
pub const PACE_BUCKET_SECS_PER_KM: u32 = 10;

/// Heart-rate bucket width (bpm).
pub const HEART_RATE_BUCKET_BPM: u32 = 5;

/// Distance bucket width (meters).
pub const DISTANCE_BUCKET_METERS: u32 = 100;

// ============================================================================
// Freshness Gate
// ============================================================================

/// Maximum age of a cached coaching message before it is regenerated (seconds).
///
/// 60 s = the one-minute freshness window.
pub const FRESHNESS_WINDOW_SECS: u64 = 60;

/// Distance the runner must cover before a cached message is replaced (meters).
pub const MIN_DISTANCE_BETWEEN_MESSAGES_M: f64 = 200.0;

/// Store-level expiry for coaching entries (seconds).
///
/// Only bounds growth of the key space. Must stay longer than the freshness window.
pub const COACHING_STORE_TTL_SECS: u64 = 300;

// ============================================================================
// Upstream (OpenRouter)
// ============================================================================

/// OpenRouter API base URL.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when the client does not select one.
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-nano";

/// Upper bound on a single generation call (seconds).
pub const GENERATION_TIMEOUT_SECS: u64 = 30;

/// Sampling temperature: slightly creative but consistent.
pub const TEMPERATURE: f64 = 0.8;

/// Nucleus sampling cutoff.
pub const TOP_P: f64 = 0.9;

/// Value of the `X-Title` header sent upstream.
pub const APP_TITLE: &str = "JogGPS AI Coaching";

/// Token budget for reasoning models (they spend tokens before answering).
pub const REASONING_MAX_TOKENS: u32 = 2_500;

/// Token budget for standard chat models.
pub const STANDARD_MAX_TOKENS: u32 = 150;

// ============================================================================
// Profiles & Run History
// ============================================================================

/// Profile retention (seconds). 2 592 000 = 30 days.
pub const PROFILE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Run record retention (seconds). 31 536 000 = 365 days.
pub const RUN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Maximum entries kept in a device's recent-runs list.
pub const RECENT_RUNS_CAP: usize = 50;

/// Runs returned by `GET /api/runs` when no limit is given.
pub const DEFAULT_RUN_LIST_LIMIT: usize = 20;

// ============================================================================
// Server & Cache Backend
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:3000";

/// Default Redis URL.
pub const REDIS_URL: &str = "redis://localhost:6379";

/// Maximum accepted request body (bytes).
pub const MAX_BODY_BYTES: usize = 64 * 1024;
