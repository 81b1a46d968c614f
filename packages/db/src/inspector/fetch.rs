//! Bounded fetches of the newest records.
//!
//! Shards are visited in catalog order and each is asked only for what is
//! still missing. Records are newest-first within one shard's contribution;
//! there is no merge across shards, so a later shard may return records newer
//! than an earlier one.

use jobsdb_core::{JobRecord, JobState, JobStatusRecord, ShardKind};

use super::Inspector;
use crate::{DbError, ShardStore};

impl<S: ShardStore> Inspector<S> {
    /// Fetch at most `limit` jobs of `queue`.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_jobs(&self, queue: &str, limit: usize) -> Result<Vec<JobRecord>, DbError> {
        let mut jobs = Vec::new();
        if limit == 0 {
            return Ok(jobs);
        }

        for shard in self.shards_of(ShardKind::Jobs, queue).await? {
            let remaining = limit - jobs.len();
            let batch = self.store.newest_jobs(&shard, remaining).await?;
            tracing::debug!(%shard, requested = remaining, fetched = batch.len(), "Fetched jobs");

            jobs.extend(batch.into_iter().take(remaining));
            if jobs.len() >= limit {
                break;
            }
        }

        Ok(jobs)
    }

    /// Fetch at most `limit` status events of `queue` in `state`.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_job_statuses(
        &self,
        queue: &str,
        limit: usize,
        state: JobState,
    ) -> Result<Vec<JobStatusRecord>, DbError> {
        let mut statuses = Vec::new();
        if limit == 0 {
            return Ok(statuses);
        }

        for shard in self.shards_of(ShardKind::JobStatus, queue).await? {
            let remaining = limit - statuses.len();
            let batch = self.store.newest_statuses(&shard, state, remaining).await?;
            tracing::debug!(%shard, requested = remaining, fetched = batch.len(), "Fetched statuses");

            statuses.extend(batch.into_iter().take(remaining));
            if statuses.len() >= limit {
                break;
            }
        }

        Ok(statuses)
    }
}
