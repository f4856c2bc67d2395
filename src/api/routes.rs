//! API route definitions
//!
//! Endpoints served to the JogGPS mobile client:
//! - /api/coaching - Coaching message for a telemetry tick
//! - /api/profile - Runner profile (training goal, recent runs)
//! - /api/runs - Completed run log and history
//! - /api/health - Cache and upstream status

use axum::{routing::{get, post}, Router};

use super::handlers::{self, AppState};

/// Create all API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/coaching", post(handlers::post_coaching))
        .route("/profile", get(handlers::get_profile).post(handlers::post_profile))
        .route("/runs", get(handlers::get_runs).post(handlers::post_run))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
