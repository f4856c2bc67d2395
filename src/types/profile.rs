//! Profile and run-history records.

use serde::{Deserialize, Serialize};

/// Race the runner is training for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingGoal {
    /// "half_marathon", "marathon", "10k", "5k"
    pub race_type: String,
    /// seconds
    pub target_time: u64,
    /// ISO date
    pub race_date: String,
}

/// One completed run as reported by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHistory {
    /// ISO date
    pub date: String,
    /// meters
    pub distance: f64,
    /// seconds
    pub duration: u64,
    /// seconds per km
    #[serde(default)]
    pub avg_pace: f64,
}

/// `POST /api/profile` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub device_id: Option<String>,
    pub created_at: Option<String>,
    pub training_goal: Option<TrainingGoal>,
    #[serde(default)]
    pub recent_runs: Vec<RunHistory>,
}

/// Stored profile document (`profile:<deviceId>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_goal: Option<TrainingGoal>,
    #[serde(default)]
    pub recent_runs: Vec<RunHistory>,
    /// RFC 3339, set by the server on every write
    pub updated_at: String,
}

/// `POST /api/runs` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLogRequest {
    pub device_id: Option<String>,
    pub date: Option<String>,
    pub distance: Option<f64>,
    pub duration: Option<u64>,
    #[serde(default)]
    pub avg_pace: f64,
}

/// Stored run document (`run:<deviceId>:<runId>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    pub device_id: String,
    #[serde(flatten)]
    pub run: RunHistory,
    /// RFC 3339
    pub logged_at: String,
}

impl ProfileUpdate {
    /// Require a device id and stamp the stored document with `updated_at`.
    pub fn into_profile(self, updated_at: String) -> Result<UserProfile, super::ValidationError> {
        let Some(device_id) = self.device_id.filter(|d| !d.trim().is_empty()) else {
            return Err(super::ValidationError::MissingFields(vec!["deviceId"]));
        };
        Ok(UserProfile {
            device_id: super::validate_device_id(&device_id)?,
            created_at: self.created_at,
            training_goal: self.training_goal,
            recent_runs: self.recent_runs,
            updated_at,
        })
    }
}

impl RunLogRequest {
    /// Require a device, a date and non-zero distance and duration.
    pub fn validate(self) -> Result<(String, RunHistory), super::ValidationError> {
        let missing: Vec<&'static str> = [
            ("deviceId", self.device_id.as_deref().map_or(true, |d| d.trim().is_empty())),
            ("date", self.date.as_deref().map_or(true, |d| d.trim().is_empty())),
            ("distance", self.distance.map_or(true, |d| d == 0.0)),
            ("duration", self.duration.map_or(true, |d| d == 0)),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(device_id), Some(date), Some(distance), Some(duration)) =
            (self.device_id, self.date, self.distance, self.duration)
        else {
            return Err(super::ValidationError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(super::ValidationError::MissingFields(missing));
        }

        let device_id = super::validate_device_id(&device_id)?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(super::ValidationError::InvalidField {
                field: "distance",
                reason: "must be a finite number > 0".to_string(),
            });
        }

        Ok((
            device_id,
            RunHistory {
                date,
                distance,
                duration,
                avg_pace: if self.avg_pace.is_finite() { self.avg_pace } else { 0.0 },
            },
        ))
    }
}
