//! Coaching request wire types and boundary validation.
//!
//! The mobile client posts a [`CoachingRequest`]; [`CoachingRequest::validate`]
//! turns it into a [`TelemetrySample`] (what the cache logic keys on) plus a
//! [`PromptContext`] (what only the prompt needs). Nothing past this boundary
//! sees a missing required field or a non-finite number.

use serde::{Deserialize, Serialize};

use super::profile::TrainingGoal;

/// Longest device identifier accepted.
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Longest model selector accepted.
pub const MAX_MODEL_LEN: usize = 128;

/// Largest accepted run distance (10 000 km).
pub const MAX_DISTANCE_METERS: f64 = 1.0e7;

/// Slowest accepted average pace.
pub const MAX_PACE_SECS_PER_KM: f64 = 1.0e5;

/// Selector that asks for the server's default model.
pub const DEFAULT_MODEL_SELECTOR: &str = "default";

// ============================================================================
// Wire Types
// ============================================================================

/// `POST /api/coaching` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingRequest {
    pub device_id: Option<String>,
    pub current_segment: Option<CurrentSegment>,
    pub run_totals: Option<RunTotals>,
    pub interval_data: Option<IntervalData>,
    pub training_goal: Option<TrainingGoal>,
    pub model: Option<String>,
}

/// Latest GPS fix from the phone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSegment {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
    pub heart_rate: Option<u32>,
    /// m/s
    pub speed: f64,
    pub elevation: Option<f64>,
    pub accuracy: f64,
    pub bearing: Option<f64>,
}

/// Cumulative run figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTotals {
    /// meters
    pub distance: f64,
    /// milliseconds
    pub duration: u64,
    /// seconds per km
    pub avg_pace: f64,
    pub avg_heart_rate: Option<u32>,
}

/// Recent interval split, used for trend hints in the prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalData {
    pub last_interval_distance: f64,
    pub last_interval_time: u64,
    pub last_interval_pace: f64,
    #[serde(default)]
    pub recent_paces: Vec<f64>,
    /// "consistent", "speeding_up", "slowing_down"
    pub pace_pattern: Option<String>,
}

// ============================================================================
// Validated Types
// ============================================================================

/// One validated telemetry tick, the input to the cache-key and freshness logic
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub device_id: String,
    /// meters, finite and >= 0
    pub distance: f64,
    /// milliseconds
    pub duration_ms: u64,
    /// seconds per km, finite and > 0
    pub avg_pace: f64,
    /// bpm; `None` when the client has no heart-rate sensor
    pub avg_heart_rate: Option<u32>,
    pub model: Option<String>,
}

/// Everything the prompt needs beyond the sample itself
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// m/s, only when the runner is moving
    pub current_speed: Option<f64>,
    pub interval: Option<IntervalData>,
    pub training_goal: Option<TrainingGoal>,
}

/// Rejected request input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl CoachingRequest {
    /// Check required fields and value ranges, splitting the request into
    /// the cacheable sample and the prompt-only context.
    pub fn validate(self) -> Result<(TelemetrySample, PromptContext), ValidationError> {
        let (Some(device_id), Some(segment), Some(totals)) =
            (self.device_id, self.current_segment, self.run_totals)
        else {
            return Err(ValidationError::MissingFields(vec![
                "deviceId",
                "currentSegment",
                "runTotals",
            ]));
        };

        let device_id = validate_device_id(&device_id)?;

        if !(0.0..=MAX_DISTANCE_METERS).contains(&totals.distance) {
            return Err(ValidationError::invalid(
                "runTotals.distance",
                format!("must be a number in 0..={MAX_DISTANCE_METERS}"),
            ));
        }
        if !(totals.avg_pace > 0.0 && totals.avg_pace <= MAX_PACE_SECS_PER_KM) {
            return Err(ValidationError::invalid(
                "runTotals.avgPace",
                format!("must be a number > 0 and <= {MAX_PACE_SECS_PER_KM}"),
            ));
        }

        // A literal "default" selector means the same as no selector.
        let model = match self.model {
            Some(m) => Some(validate_model(&m)?).filter(|m| m != DEFAULT_MODEL_SELECTOR),
            None => None,
        };

        let current_speed = segment
            .speed
            .is_finite()
            .then_some(segment.speed)
            .filter(|s| *s > 0.0);

        let interval = self.interval_data.filter(|i| {
            i.last_interval_pace.is_finite() && i.last_interval_pace > 0.0
        });

        Ok((
            TelemetrySample {
                device_id,
                distance: totals.distance,
                duration_ms: totals.duration,
                avg_pace: totals.avg_pace,
                // Some watches report 0 when the strap is disconnected.
                avg_heart_rate: totals.avg_heart_rate.filter(|hr| *hr > 0),
                model,
            },
            PromptContext {
                current_speed,
                interval,
                training_goal: self.training_goal,
            },
        ))
    }
}

/// Validate a device identifier for use in storage keys and key patterns.
///
/// Rejects empty values, control characters, whitespace and glob
/// metacharacters (`*`, `?`, `[`, `]`, `\`) so a device-scoped wildcard pattern can
/// never reach another device's keys.
pub fn validate_device_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingFields(vec!["deviceId"]));
    }
    if id.len() > MAX_DEVICE_ID_LEN {
        return Err(ValidationError::invalid(
            "deviceId",
            format!("must be at most {MAX_DEVICE_ID_LEN} bytes"),
        ));
    }
    if let Some(c) = id
        .chars()
        .find(|c| {
            c.is_control() || c.is_whitespace() || matches!(c, '*' | '?' | '[' | ']' | '\\')
        })
    {
        return Err(ValidationError::invalid(
            "deviceId",
            format!("contains forbidden character {c:?}"),
        ));
    }
    Ok(id.to_string())
}

fn validate_model(raw: &str) -> Result<String, ValidationError> {
    let model = raw.trim();
    if model.len() > MAX_MODEL_LEN {
        return Err(ValidationError::invalid(
            "model",
            format!("must be at most {MAX_MODEL_LEN} bytes"),
        ));
    }
    if model.chars().any(char::is_control) {
        return Err(ValidationError::invalid("model", "contains control characters"));
    }
    Ok(model.to_string())
}
