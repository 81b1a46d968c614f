//! Job records as written by the producer side into `<queue>_jobs_*` shards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row identifier of a job within its shard.
pub type JobId = i64;

/// Routing parameters stored alongside each job.
///
/// The producer writes these as a JSON object; two jobs belong to the same
/// source/destination pair when their parameter objects are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobParameters {
    pub source_id: String,
    pub destination_id: String,
}

impl JobParameters {
    pub fn new(source_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            destination_id: destination_id.into(),
        }
    }

    /// JSON object form, as compared against the stored `parameters` column.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "source_id": self.source_id,
            "destination_id": self.destination_id,
        })
    }

    /// Check whether a stored parameters object is exactly this pair.
    ///
    /// Key order and whitespace are irrelevant; extra keys make it a mismatch.
    pub fn matches(&self, stored: &serde_json::Value) -> bool {
        *stored == self.to_value()
    }
}

/// A job as stored in one jobs shard. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Shard-local job id.
    pub id: JobId,
    /// Correlation id assigned by the producer.
    pub uuid: Uuid,
    /// Free-form tag, usually the destination type.
    pub custom_val: String,
    /// Event payload, opaque to the harness.
    pub payload: Vec<u8>,
    /// Routing parameters object.
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a record with the given id and payload, created now.
    pub fn new(id: JobId, custom_val: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        let now = Utc::now();
        Self {
            id,
            uuid: Uuid::nil(),
            custom_val: custom_val.into(),
            payload: payload.into(),
            parameters: serde_json::Value::Null,
            created_at: now,
            expire_at: now,
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn with_parameters(mut self, parameters: &JobParameters) -> Self {
        self.parameters = parameters.to_value();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        if self.expire_at < created_at {
            self.expire_at = created_at;
        }
        self
    }

    /// Payload as UTF-8 text, replacing invalid sequences.
    pub fn payload_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_match_regardless_of_key_order() {
        let params = JobParameters::new("src-1", "dst-1");
        let stored: serde_json::Value =
            serde_json::from_str(r#"{ "destination_id":"dst-1",  "source_id":"src-1" }"#)
                .unwrap();
        assert!(params.matches(&stored));
    }

    #[test]
    fn parameters_with_extra_keys_do_not_match() {
        let params = JobParameters::new("src-1", "dst-1");
        let stored = serde_json::json!({
            "source_id": "src-1",
            "destination_id": "dst-1",
            "source_batch_id": "b-7",
        });
        assert!(!params.matches(&stored));
        assert!(!params.matches(&serde_json::Value::Null));
    }

    #[test]
    fn created_at_pulls_expiry_forward() {
        let later = Utc::now() + chrono::Duration::hours(1);
        let job = JobRecord::new(1, "S3", b"{}".to_vec()).with_created_at(later);
        assert_eq!(job.expire_at, later);
        assert_eq!(job.payload_lossy(), "{}");
    }
}
