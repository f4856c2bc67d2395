//! Runner profile endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use super::{AppState, DeviceQuery};
use crate::api::envelope::{self, ApiErrorResponse};
use crate::cache::{get_json, set_json};
use crate::config::defaults::PROFILE_TTL_SECS;
use crate::types::{ProfileUpdate, UserProfile};

/// Store key for a device's profile document.
pub fn profile_key(device_id: &str) -> String {
    format!("profile:{device_id}")
}

/// POST /api/profile - Store the runner's profile
///
/// A profile carrying a training goal drops the device's cached coaching
/// messages so the next tick is generated against the new goal.
pub async fn post_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let profile = match update.into_profile(Utc::now().to_rfc3339()) {
        Ok(p) => p,
        Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
    };

    let key = profile_key(&profile.device_id);
    let ttl = Duration::from_secs(PROFILE_TTL_SECS);
    if let Err(e) = set_json(state.store.as_ref(), &key, &profile, ttl).await {
        warn!(device_id = %profile.device_id, error = %e, "Profile write failed");
        return ApiErrorResponse::service_unavailable("Profile store unavailable");
    }
    info!(device_id = %profile.device_id, "Profile updated");

    let mut invalidated = 0;
    if let Some(goal) = &profile.training_goal {
        info!(
            device_id = %profile.device_id,
            race_type = %goal.race_type,
            target_time = goal.target_time,
            "Training goal updated"
        );
        invalidated = match state.coaching.invalidate_device(&profile.device_id).await {
            Ok(n) => n,
            Err(e) => {
                warn!(device_id = %profile.device_id, error = %e, "Coaching invalidation failed");
                return ApiErrorResponse::service_unavailable("Coaching cache unavailable");
            }
        };
    }

    envelope::ok(serde_json::json!({
        "success": true,
        "invalidated": invalidated,
    }))
}

/// GET /api/profile?deviceId= - Fetch a stored profile
pub async fn get_profile(State(state): State<AppState>, Query(q): Query<DeviceQuery>) -> Response {
    let Some(device_id) = q.device_id() else {
        return ApiErrorResponse::bad_request("Missing deviceId parameter");
    };

    match get_json::<UserProfile>(state.store.as_ref(), &profile_key(device_id)).await {
        Ok(Some(profile)) => envelope::ok(profile),
        Ok(None) => ApiErrorResponse::not_found("Profile not found"),
        Err(e) => {
            warn!(device_id = %device_id, error = %e, "Profile read failed");
            ApiErrorResponse::service_unavailable("Profile store unavailable")
        }
    }
}
