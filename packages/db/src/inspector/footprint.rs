use jobsdb_core::ShardName;

use super::Inspector;
use crate::{DbError, ShardStore};

impl<S: ShardStore> Inspector<S> {
    /// On-disk size of one shard in bytes, indexes and toast included.
    ///
    /// An empty shard may still report a non-zero size.
    pub async fn table_size(&self, shard: &ShardName) -> Result<u64, DbError> {
        let size = self.store.total_relation_size(shard.as_str()).await?;
        tracing::debug!(%shard, size, "Measured shard");
        Ok(size)
    }
}
