//! Status events written by consumers into `<queue>_job_status_*` shards.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::JobId;

/// Processing state recorded by a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is pending pickup.
    Waiting,
    Executing,
    Succeeded,
    /// Job failed and is scheduled for another attempt.
    WaitingRetry,
    Failed,
    /// Job gave up after exhausting its attempts.
    Aborted,
    Migrating,
    Migrated,
    Importing,
    Throttled,
}

impl JobState {
    pub const ALL: [JobState; 10] = [
        JobState::Waiting,
        JobState::Executing,
        JobState::Succeeded,
        JobState::WaitingRetry,
        JobState::Failed,
        JobState::Aborted,
        JobState::Migrating,
        JobState::Migrated,
        JobState::Importing,
        JobState::Throttled,
    ];

    /// Column value as stored in `job_state`.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Waiting => "waiting",
            JobState::Executing => "executing",
            JobState::Succeeded => "succeeded",
            JobState::WaitingRetry => "waiting_retry",
            JobState::Failed => "failed",
            JobState::Aborted => "aborted",
            JobState::Migrating => "migrating",
            JobState::Migrated => "migrated",
            JobState::Importing => "importing",
            JobState::Throttled => "throttled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an exact job state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job state: {0:?}")]
pub struct ParseJobStateError(pub String);

impl FromStr for JobState {
    type Err = ParseJobStateError;

    /// Case-sensitive: `"Failed"` is not `failed`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseJobStateError(s.to_string()))
    }
}

/// One status event for a job.
///
/// Status shards do not share a fixed column set, so every column beyond the
/// ones named here is kept in `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub id: i64,
    pub job_id: JobId,
    #[serde(rename = "job_state")]
    pub state: JobState,
    #[serde(deserialize_with = "utc_or_naive")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub columns: serde_json::Map<String, serde_json::Value>,
}

impl JobStatusRecord {
    pub fn new(id: i64, job_id: JobId, state: JobState) -> Self {
        Self {
            id,
            job_id,
            state,
            created_at: Utc::now(),
            columns: serde_json::Map::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Add a shard-specific column.
    pub fn with_column(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    /// Look up a shard-specific column.
    pub fn column(&self, name: &str) -> Option<&serde_json::Value> {
        self.columns.get(name)
    }
}

/// Accept RFC 3339 timestamps and zone-less ones, the latter read as UTC.
fn utc_or_naive<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
