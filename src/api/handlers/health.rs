//! Health endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use super::AppState;
use crate::api::envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Up,
    Down,
    Configured,
    Missing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealth {
    pub status: ServiceStatus,
    pub backend: &'static str,
    pub response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct UpstreamHealth {
    pub status: ServiceStatus,
}

#[derive(Debug, Serialize)]
pub struct ServicesHealth {
    pub cache: CacheHealth,
    pub openrouter: UpstreamHealth,
}

/// `GET /api/health` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub services: ServicesHealth,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// GET /api/health - Cache reachability and upstream configuration
///
/// 200 when the cache answers and an upstream key is configured, else 503.
pub async fn get_health(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let cache_up = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(backend = state.store.backend_name(), error = %e, "Cache health check failed");
            false
        }
    };
    let response_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let configured = state.invoker.is_configured();

    let status = if cache_up && configured {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    let body = HealthResponse {
        status,
        timestamp: Utc::now().to_rfc3339(),
        services: ServicesHealth {
            cache: CacheHealth {
                status: if cache_up { ServiceStatus::Up } else { ServiceStatus::Down },
                backend: state.store.backend_name(),
                response_time_ms,
            },
            openrouter: UpstreamHealth {
                status: if configured {
                    ServiceStatus::Configured
                } else {
                    ServiceStatus::Missing
                },
            },
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    };

    debug!(status = ?status, cache_ms = response_time_ms, "Health check");
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    envelope::with_status(code, body)
}
