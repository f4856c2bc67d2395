//! Run history endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

use super::{AppState, DeviceQuery};
use crate::api::envelope::{self, ApiErrorResponse};
use crate::cache::{get_json, set_json, CacheError, CacheStore};
use crate::config::defaults::{DEFAULT_RUN_LIST_LIMIT, RECENT_RUNS_CAP, RUN_TTL_SECS};
use crate::types::{RunHistory, RunLogRequest, RunRecord};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random suffix length of a run id.
const RUN_ID_SUFFIX_LEN: usize = 9;

pub fn run_key(device_id: &str, run_id: &str) -> String {
    format!("run:{device_id}:{run_id}")
}

pub fn recent_runs_key(device_id: &str) -> String {
    format!("recent_runs:{device_id}")
}

/// `<epoch millis>-<9 base36 chars>`
pub fn new_run_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RUN_ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{}-{suffix}", Utc::now().timestamp_millis())
}

/// Write the run document and push it onto the device's recent list.
///
/// The list update is read-modify-write; concurrent logs for one device can
/// drop an entry from the list (the run document itself is always kept).
async fn store_run(store: &dyn CacheStore, record: &RunRecord) -> Result<(), CacheError> {
    let ttl = Duration::from_secs(RUN_TTL_SECS);
    set_json(store, &run_key(&record.device_id, &record.id), record, ttl).await?;

    let list_key = recent_runs_key(&record.device_id);
    let mut recent: Vec<RunHistory> = get_json(store, &list_key).await?.unwrap_or_default();
    recent.insert(0, record.run.clone());
    recent.truncate(RECENT_RUNS_CAP);
    set_json(store, &list_key, &recent, ttl).await
}

/// POST /api/runs - Log a completed run
pub async fn post_run(
    State(state): State<AppState>,
    payload: Result<Json<RunLogRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::from_rejection(&rejection),
    };

    let (device_id, run) = match request.validate() {
        Ok(v) => v,
        Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
    };

    let record = RunRecord {
        id: new_run_id(),
        device_id,
        run,
        logged_at: Utc::now().to_rfc3339(),
    };

    if let Err(e) = store_run(state.store.as_ref(), &record).await {
        warn!(device_id = %record.device_id, error = %e, "Run log failed");
        return ApiErrorResponse::service_unavailable("Run store unavailable");
    }

    info!(
        device_id = %record.device_id,
        run_id = %record.id,
        distance_km = record.run.distance / 1000.0,
        duration_secs = record.run.duration,
        "Run logged"
    );
    envelope::ok(serde_json::json!({
        "success": true,
        "runId": record.id,
    }))
}

/// GET /api/runs?deviceId=&limit=20 - Most recent runs, newest first
pub async fn get_runs(State(state): State<AppState>, Query(q): Query<DeviceQuery>) -> Response {
    let Some(device_id) = q.device_id() else {
        return ApiErrorResponse::bad_request("Missing deviceId parameter");
    };
    let limit = q
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_RUN_LIST_LIMIT);

    match get_json::<Vec<RunHistory>>(state.store.as_ref(), &recent_runs_key(device_id)).await {
        Ok(runs) => {
            let mut runs = runs.unwrap_or_default();
            runs.truncate(limit);
            envelope::ok(runs)
        }
        Err(e) => {
            warn!(device_id = %device_id, error = %e, "Run history read failed");
            ApiErrorResponse::service_unavailable("Run store unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn record(id: &str, distance: f64) -> RunRecord {
        RunRecord {
            id: id.to_string(),
            device_id: "d1".to_string(),
            run: RunHistory {
                date: "2025-08-01".to_string(),
                distance,
                duration: 1500,
                avg_pace: 300.0,
            },
            logged_at: "2025-08-01T07:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_run_id_shape() {
        let id = new_run_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), RUN_ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[tokio::test]
    async fn test_recent_runs_newest_first_and_capped() {
        let store = MemoryStore::new();
        for i in 0..(RECENT_RUNS_CAP + 5) {
            store_run(&store, &record(&format!("r{i}"), 1000.0 + i as f64))
                .await
                .unwrap();
        }

        let recent: Vec<RunHistory> = get_json(&store, &recent_runs_key("d1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recent.len(), RECENT_RUNS_CAP);
        assert!((recent[0].distance - (1000.0 + (RECENT_RUNS_CAP + 4) as f64)).abs() < 1e-9);

        let stored: RunRecord = get_json(&store, &run_key("d1", "r0")).await.unwrap().unwrap();
        assert_eq!(stored.id, "r0");
    }
}
