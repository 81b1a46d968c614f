use jobsdb_core::snapshot_prefix;

use super::Inspector;
use crate::{DbError, ShardStore};

impl<S: ShardStore> Inspector<S> {
    /// List the databases left behind by maintenance runs of `queue`.
    ///
    /// These are the databases named `original_<queue>_*`; `_` in the queue
    /// name is matched literally.
    pub async fn list_maintenance_snapshots(&self, queue: &str) -> Result<Vec<String>, DbError> {
        let prefix = snapshot_prefix(queue);
        let names = self.store.database_names_with_prefix(&prefix).await?;
        tracing::debug!(prefix = %prefix, snapshots = names.len(), "Listed maintenance snapshots");
        Ok(names)
    }
}
