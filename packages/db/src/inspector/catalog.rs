use jobsdb_core::{ShardKind, ShardName};

use super::Inspector;
use crate::{DbError, ShardStore};

impl<S: ShardStore> Inspector<S> {
    /// List the shards whose table name starts with `prefix`.
    ///
    /// The match is case-sensitive, so callers pass an already lower-cased
    /// prefix. Shards come back sorted by name.
    pub async fn list_shards(&self, prefix: &str) -> Result<Vec<ShardName>, DbError> {
        let mut shards: Vec<ShardName> = self
            .store
            .table_names()
            .await?
            .into_iter()
            .map(ShardName::from)
            .filter(|name| name.has_prefix(prefix))
            .collect();
        shards.sort();

        tracing::debug!(prefix, shards = shards.len(), "Resolved shard set");
        Ok(shards)
    }

    /// Shards of one family of `queue`.
    pub(crate) async fn shards_of(
        &self,
        kind: ShardKind,
        queue: &str,
    ) -> Result<Vec<ShardName>, DbError> {
        self.list_shards(&kind.prefix(queue)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Inspector, MemoryStore};

    #[tokio::test]
    async fn keeps_only_prefixed_tables_in_name_order() -> Result<(), crate::DbError> {
        let store = MemoryStore::new()
            .with_table("gw_jobs_2", 0)
            .with_table("gw_jobs_1", 0)
            .with_table("GW_jobs_3", 0)
            .with_table("gw_job_status_1", 0)
            .with_table("rt_jobs_1", 0);
        let inspector = Inspector::new(store);

        let shards = inspector.list_shards("gw_jobs_").await?;
        let names: Vec<&str> = shards.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["gw_jobs_1", "gw_jobs_2"]);
        Ok(())
    }
}
