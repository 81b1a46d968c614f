//! Read-side inspection of a sharded jobs database.
//!
//! This crate resolves the shard tables of a queue from the store's catalog
//! and answers aggregate questions across them: row counts, the newest jobs
//! and status events, shard sizes and maintenance snapshots.
//!
//! # Backends
//!
//! - [`PgStore`]: PostgreSQL through a caller-owned `sqlx` pool
//! - [`MemoryStore`]: in-process tables for tests and fixtures

mod connection;
mod error;
mod inspector;
mod store;

pub use connection::{DbConfig, connect};
pub use error::DbError;
pub use inspector::Inspector;
pub use store::{MemoryStore, PgStore, RowFilter, ShardStore};

/// Inspector over a PostgreSQL pool.
pub type PgInspector = Inspector<PgStore>;

/// Connect using `config` and wrap the pool in an inspector.
///
/// The pool stays reachable through [`Inspector::store`] so the caller can
/// close it.
pub async fn open(config: &DbConfig) -> Result<PgInspector, DbError> {
    let pool = connect(config).await?;
    Ok(Inspector::new(PgStore::new(pool)))
}
