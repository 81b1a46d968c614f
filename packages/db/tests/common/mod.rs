#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use jobsdb_core::{JobParameters, JobRecord, JobState, JobStatusRecord};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A job created `minutes` after the base time.
pub fn job(id: i64, minutes: i64) -> JobRecord {
    JobRecord::new(id, "S3", format!(r#"{{"job":{id}}}"#))
        .with_uuid(uuid::Uuid::new_v4())
        .with_created_at(base_time() + Duration::minutes(minutes))
}

pub fn routed_job(id: i64, minutes: i64, source_id: &str, destination_id: &str) -> JobRecord {
    job(id, minutes).with_parameters(&JobParameters::new(source_id, destination_id))
}

/// `count` jobs with ids starting at `first_id`, one minute apart.
pub fn jobs(first_id: i64, count: i64) -> Vec<JobRecord> {
    (0..count).map(|n| job(first_id + n, n)).collect()
}

pub fn status(id: i64, job_id: i64, state: JobState, minutes: i64) -> JobStatusRecord {
    JobStatusRecord::new(id, job_id, state)
        .with_created_at(base_time() + Duration::minutes(minutes))
}
