//! CacheStore trait: pluggable key-value backend with per-key expiry
//!
//! The coaching cache, profiles and run history all live in one key-value
//! store. Backends:
//! - `RedisStore`: shared Redis instance, connected on first use
//! - `MemoryStore`: process-local map for development and tests
//!
//! The store handle is created once at startup and passed to whoever needs
//! it as `Arc<dyn CacheStore>`.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, CacheConfig};

/// Trait for key-value backends with TTLs
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a raw value
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a raw value with an expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Delete keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Enumerate live keys matching a glob pattern (`*`, `?`).
    ///
    /// Maintenance operation; not for the per-request path.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Round-trip check for health reporting
    async fn ping(&self) -> Result<(), CacheError>;

    /// Release any held connection. The store reconnects on next use.
    async fn close(&self) {}

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Store unreachable, timed out, or rejected the command
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Build the configured backend.
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisStore::new(&config.redis_url)?)),
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Fetch and deserialize a JSON document.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store a JSON document.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), CacheError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw, ttl).await
}

/// Delete every key matching `pattern`, returning the number removed.
pub async fn delete_matching(store: &dyn CacheStore, pattern: &str) -> Result<u64, CacheError> {
    let keys = store.keys(pattern).await?;
    if keys.is_empty() {
        return Ok(0);
    }
    store.delete(&keys).await
}

/// Glob match supporting `*` (any run) and `?` (any one char).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}
