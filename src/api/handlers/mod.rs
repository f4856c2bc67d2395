//! API route handlers
//!
//! Request handling logic for all API endpoints including:
//! - Coaching message resolution
//! - Runner profile storage
//! - Run history logging
//! - Health reporting

mod coaching;
mod health;
mod profile;
mod runs;

pub use coaching::*;
pub use health::*;
pub use profile::*;
pub use runs::*;

use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::CacheStore;
use crate::coaching::CoachingService;
use crate::config::CoachConfig;
use crate::llm::GenerationInvoker;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Key-value store for coaching entries, profiles and runs
    pub store: Arc<dyn CacheStore>,
    /// Cache-or-generate coaching flow
    pub coaching: Arc<CoachingService>,
    /// Upstream generator, held for health reporting
    pub invoker: Arc<dyn GenerationInvoker>,
    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: &CoachConfig,
        store: Arc<dyn CacheStore>,
        invoker: Arc<dyn GenerationInvoker>,
    ) -> Self {
        let coaching = CoachingService::from_config(config, Arc::clone(&store), Arc::clone(&invoker));
        Self {
            store,
            coaching: Arc::new(coaching),
            invoker,
            started_at: Instant::now(),
        }
    }
}

/// `?deviceId=&limit=` query shared by the GET endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceQuery {
    pub device_id: Option<String>,
    pub limit: Option<String>,
}

impl DeviceQuery {
    /// Non-blank device id, if given.
    fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}
