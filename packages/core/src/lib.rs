//! Core domain types for inspecting a sharded job queue.
//!
//! This crate contains the shared types used across all packages:
//! - ShardName and ShardKind for the table naming convention
//! - JobRecord and JobParameters for job shards
//! - JobStatusRecord and JobState for status shards
//! - RecoveryState for the server's persisted startup mode

mod job;
mod recovery;
mod shard;
mod status;

pub use job::{JobId, JobParameters, JobRecord};
pub use recovery::{RecoveryMode, RecoveryState};
pub use shard::{ShardKind, ShardName, snapshot_prefix};
pub use status::{JobState, JobStatusRecord, ParseJobStateError};
