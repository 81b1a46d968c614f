//! Storage backends the inspector reads shards through.
//!
//! A backend only answers per-table questions; discovering shards and
//! aggregating across them is the inspector's job.

mod memory;
mod postgres;

use jobsdb_core::{JobParameters, JobRecord, JobState, JobStatusRecord, ShardName};

use crate::DbError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row predicate applied when counting rows of one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Every row.
    All,
    /// Jobs whose parameters object equals this pair.
    Parameters(JobParameters),
    /// Status events in exactly this state.
    State(JobState),
}

/// Read access to a relational store holding queue shards.
///
/// Implementations run each call as a single round-trip and keep no state
/// between calls.
#[allow(async_fn_in_trait)]
pub trait ShardStore {
    /// Names of all user tables, system schemas excluded.
    async fn table_names(&self) -> Result<Vec<String>, DbError>;

    /// Number of rows in `shard` matching `filter`.
    async fn count_rows(&self, shard: &ShardName, filter: &RowFilter) -> Result<u64, DbError>;

    /// Up to `limit` jobs of `shard`, newest first (`created_at`, then id).
    async fn newest_jobs(&self, shard: &ShardName, limit: usize)
    -> Result<Vec<JobRecord>, DbError>;

    /// Up to `limit` status events of `shard` in `state`, newest first.
    async fn newest_statuses(
        &self,
        shard: &ShardName,
        state: JobState,
        limit: usize,
    ) -> Result<Vec<JobStatusRecord>, DbError>;

    /// On-disk size of a relation in bytes, indexes and toast included.
    async fn total_relation_size(&self, relation: &str) -> Result<u64, DbError>;

    /// Names of databases starting with `prefix`, sorted.
    async fn database_names_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError>;
}
