use jobsdb_core::ShardName;
use thiserror::Error;

/// Database errors.
///
/// Every variant is fatal for the operation that produced it: aggregates are
/// never returned from a partial set of shards.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Shard {shard} does not have the expected shape: {reason}")]
    SchemaMismatch { shard: ShardName, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    pub(crate) fn mismatch(shard: &ShardName, reason: impl std::fmt::Display) -> Self {
        DbError::SchemaMismatch {
            shard: shard.clone(),
            reason: reason.to_string(),
        }
    }
}
