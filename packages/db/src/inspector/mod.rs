//! Read-side operations over a sharded jobs database.
//!
//! Every count or fetch first resolves the current shard set through the
//! catalog, then visits the shards one at a time. Nothing is cached between
//! calls, and the first failing shard aborts the whole operation.

mod catalog;
mod counts;
mod fetch;
mod footprint;
mod snapshots;

use crate::ShardStore;

/// Inspector over a caller-supplied store.
#[derive(Debug, Clone)]
pub struct Inspector<S> {
    store: S,
}

impl<S: ShardStore> Inspector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
