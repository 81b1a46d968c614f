use jobsdb_core::{JobParameters, JobState, ShardKind};

use super::Inspector;
use crate::{DbError, RowFilter, ShardStore};

impl<S: ShardStore> Inspector<S> {
    /// Count all jobs of `queue` across its jobs shards.
    #[tracing::instrument(skip(self), err)]
    pub async fn count_jobs(&self, queue: &str) -> Result<u64, DbError> {
        self.sum_rows(ShardKind::Jobs, queue, &RowFilter::All).await
    }

    /// Count jobs of `queue` routed from `source_id` to `destination_id`.
    ///
    /// A job matches when its parameters object is exactly
    /// `{"source_id": .., "destination_id": ..}`, compared as JSON rather than
    /// as text.
    #[tracing::instrument(skip(self), err)]
    pub async fn count_jobs_for(
        &self,
        queue: &str,
        source_id: &str,
        destination_id: &str,
    ) -> Result<u64, DbError> {
        let filter = RowFilter::Parameters(JobParameters::new(source_id, destination_id));
        self.sum_rows(ShardKind::Jobs, queue, &filter).await
    }

    /// Count status events of `queue` in exactly `state`.
    #[tracing::instrument(skip(self), err)]
    pub async fn count_by_state(&self, queue: &str, state: JobState) -> Result<u64, DbError> {
        self.sum_rows(ShardKind::JobStatus, queue, &RowFilter::State(state))
            .await
    }

    async fn sum_rows(
        &self,
        kind: ShardKind,
        queue: &str,
        filter: &RowFilter,
    ) -> Result<u64, DbError> {
        let mut total = 0u64;
        for shard in self.shards_of(kind, queue).await? {
            let rows = self.store.count_rows(&shard, filter).await?;
            tracing::debug!(%shard, rows, "Counted shard");
            total += rows;
        }
        Ok(total)
    }
}
