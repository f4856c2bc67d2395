//! Coaching endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use super::AppState;
use crate::api::envelope::{self, ApiErrorResponse};
use crate::coaching::{CoachingOutcome, MessageSource};
use crate::types::CoachingRequest;

/// `POST /api/coaching` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingResponse {
    pub message: String,
    pub was_cached: bool,
    pub source: MessageSource,
    /// Only reported for cache hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl From<CoachingOutcome> for CoachingResponse {
    fn from(outcome: CoachingOutcome) -> Self {
        Self {
            message: outcome.message,
            was_cached: outcome.was_cached,
            source: outcome.source,
            cache_key: outcome.was_cached.then_some(outcome.cache_key),
        }
    }
}

/// POST /api/coaching - Coaching message for the current telemetry tick
///
/// Always 200 once the request validates: cache trouble regenerates and
/// generation trouble returns a fallback message.
pub async fn post_coaching(
    State(state): State<AppState>,
    payload: Result<Json<CoachingRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let (sample, ctx) = match request.validate() {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Rejected coaching request");
            return ApiErrorResponse::bad_request(e.to_string());
        }
    };

    let outcome = state.coaching.resolve_coaching_message(&sample, &ctx).await;
    info!(
        device_id = %sample.device_id,
        distance = sample.distance,
        source = ?outcome.source,
        "Coaching request served"
    );
    envelope::ok(CoachingResponse::from(outcome))
}
