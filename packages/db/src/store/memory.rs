//! In-process backend for tests and fixtures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use jobsdb_core::{JobRecord, JobState, JobStatusRecord, ShardName};

use super::{RowFilter, ShardStore};
use crate::DbError;

/// Bytes reported for a relation before any row is counted.
const RELATION_OVERHEAD: u64 = 8192;

#[derive(Debug, Clone)]
enum MemoryTable {
    Jobs(Vec<JobRecord>),
    Statuses(Vec<JobStatusRecord>),
    /// A table of no interest to the inspector, with only a row count.
    Other(u64),
}

/// Store holding tables and database names in memory.
///
/// Tables are listed in name order. Every per-shard statement is recorded so
/// tests can check which shards an operation visited.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
    databases: BTreeSet<String>,
    failing: BTreeSet<String>,
    visited: Mutex<Vec<ShardName>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a jobs table.
    pub fn with_jobs(mut self, name: impl Into<String>, jobs: Vec<JobRecord>) -> Self {
        self.tables.insert(name.into(), MemoryTable::Jobs(jobs));
        self
    }

    /// Add (or replace) a status table.
    pub fn with_statuses(mut self, name: impl Into<String>, statuses: Vec<JobStatusRecord>) -> Self {
        self.tables.insert(name.into(), MemoryTable::Statuses(statuses));
        self
    }

    /// Add an unrelated table with `rows` rows.
    pub fn with_table(mut self, name: impl Into<String>, rows: u64) -> Self {
        self.tables.insert(name.into(), MemoryTable::Other(rows));
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.databases.insert(name.into());
        self
    }

    /// Make every statement against `name` fail as if the server went away.
    pub fn with_failing_table(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Shards touched by per-shard statements so far, in call order.
    pub fn visited(&self) -> Vec<ShardName> {
        match self.visited.lock() {
            Ok(visited) => visited.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn table(&self, name: &str) -> Result<&MemoryTable, DbError> {
        match self.visited.lock() {
            Ok(mut visited) => visited.push(ShardName::new(name)),
            Err(poisoned) => poisoned.into_inner().push(ShardName::new(name)),
        }
        if self.failing.contains(name) {
            return Err(DbError::Query(format!("{name}: connection reset by peer")));
        }
        self.tables
            .get(name)
            .ok_or_else(|| DbError::NotFound(format!("relation {name}")))
    }
}

impl ShardStore for MemoryStore {
    async fn table_names(&self) -> Result<Vec<String>, DbError> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn count_rows(&self, shard: &ShardName, filter: &RowFilter) -> Result<u64, DbError> {
        let count = match (self.table(shard.as_str())?, filter) {
            (MemoryTable::Jobs(jobs), RowFilter::All) => jobs.len(),
            (MemoryTable::Jobs(jobs), RowFilter::Parameters(params)) => jobs
                .iter()
                .filter(|job| params.matches(&job.parameters))
                .count(),
            (MemoryTable::Statuses(statuses), RowFilter::All) => statuses.len(),
            (MemoryTable::Statuses(statuses), RowFilter::State(state)) => statuses
                .iter()
                .filter(|status| status.state == *state)
                .count(),
            (MemoryTable::Other(rows), RowFilter::All) => return Ok(*rows),
            (_, RowFilter::Parameters(_)) => {
                return Err(DbError::mismatch(shard, "column \"parameters\" does not exist"));
            }
            (_, RowFilter::State(_)) => {
                return Err(DbError::mismatch(shard, "column \"job_state\" does not exist"));
            }
        };
        Ok(count as u64)
    }

    async fn newest_jobs(
        &self,
        shard: &ShardName,
        limit: usize,
    ) -> Result<Vec<JobRecord>, DbError> {
        let MemoryTable::Jobs(jobs) = self.table(shard.as_str())? else {
            return Err(DbError::mismatch(shard, "not a jobs table"));
        };

        let mut jobs = jobs.clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn newest_statuses(
        &self,
        shard: &ShardName,
        state: JobState,
        limit: usize,
    ) -> Result<Vec<JobStatusRecord>, DbError> {
        let MemoryTable::Statuses(statuses) = self.table(shard.as_str())? else {
            return Err(DbError::mismatch(shard, "not a job status table"));
        };

        let mut statuses: Vec<JobStatusRecord> = statuses
            .iter()
            .filter(|status| status.state == state)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        statuses.truncate(limit);
        Ok(statuses)
    }

    async fn total_relation_size(&self, relation: &str) -> Result<u64, DbError> {
        let row_bytes = match self.table(relation)? {
            MemoryTable::Jobs(jobs) => serialized_len(jobs)?,
            MemoryTable::Statuses(statuses) => serialized_len(statuses)?,
            MemoryTable::Other(rows) => rows * 64,
        };
        Ok(RELATION_OVERHEAD + row_bytes)
    }

    async fn database_names_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        Ok(self
            .databases
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }
}

fn serialized_len<T: serde::Serialize>(rows: &[T]) -> Result<u64, DbError> {
    rows.iter().try_fold(0u64, |total, row| {
        let bytes = serde_json::to_vec(row).map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(total + bytes.len() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsdb_core::JobParameters;

    #[tokio::test]
    async fn statements_are_recorded_per_shard() -> Result<(), DbError> {
        let store = MemoryStore::new()
            .with_jobs("gw_jobs_1", vec![JobRecord::new(1, "S3", "{}")])
            .with_table("users", 3);

        assert_eq!(store.count_rows(&"gw_jobs_1".into(), &RowFilter::All).await?, 1);
        assert_eq!(store.count_rows(&"users".into(), &RowFilter::All).await?, 3);
        assert_eq!(store.visited(), vec![ShardName::new("gw_jobs_1"), ShardName::new("users")]);
        Ok(())
    }

    #[tokio::test]
    async fn visits_survive_a_poisoned_lock() -> Result<(), DbError> {
        let store = MemoryStore::new().with_table("users", 1);
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = store.visited.lock();
                    panic!("panic while recording");
                })
                .join();
        });
        assert!(store.visited.is_poisoned());

        store.count_rows(&"users".into(), &RowFilter::All).await?;
        assert_eq!(store.visited(), vec![ShardName::new("users")]);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_shape_is_a_mismatch() {
        let store = MemoryStore::new().with_statuses("gw_jobs_1", Vec::new());

        let fetched = store.newest_jobs(&"gw_jobs_1".into(), 5).await;
        assert!(matches!(fetched, Err(DbError::SchemaMismatch { .. })));

        let filter = RowFilter::Parameters(JobParameters::new("s", "d"));
        let counted = store.count_rows(&"gw_jobs_1".into(), &filter).await;
        assert!(matches!(counted, Err(DbError::SchemaMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_relation_is_not_found() {
        let store = MemoryStore::new();
        let size = store.total_relation_size("gw_jobs_9").await;
        assert!(matches!(size, Err(DbError::NotFound(_))));
    }
}
