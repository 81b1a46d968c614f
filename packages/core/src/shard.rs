//! Shard naming conventions shared with the producer side.
//!
//! Shards of a queue are plain tables named `<queue>_jobs_<suffix>` and
//! `<queue>_job_status_<suffix>`, where `<queue>` is lower-cased. Backups taken
//! during maintenance are whole databases named `original_<queue>_<suffix>`.

use serde::{Deserialize, Serialize};

/// Name of one physical shard table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardName(String);

impl ShardName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }

    /// Check whether this shard belongs to the given name prefix (case-sensitive).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ShardName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShardName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ShardName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ShardName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The two shard families of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardKind {
    Jobs,
    JobStatus,
}

impl ShardKind {
    fn infix(self) -> &'static str {
        match self {
            ShardKind::Jobs => "jobs",
            ShardKind::JobStatus => "job_status",
        }
    }

    /// Table-name prefix of this family for `queue`, e.g. `gw_jobs_`.
    pub fn prefix(self, queue: &str) -> String {
        format!("{}_{}_", queue.to_lowercase(), self.infix())
    }

    /// Full shard name for a given suffix, e.g. `gw_job_status_3`.
    pub fn shard(self, queue: &str, suffix: impl std::fmt::Display) -> ShardName {
        ShardName(format!("{}{}", self.prefix(queue), suffix))
    }
}

impl std::fmt::Display for ShardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.infix())
    }
}

/// Database-name prefix of maintenance snapshots for `queue`.
///
/// The queue name is used verbatim, without lower-casing.
pub fn snapshot_prefix(queue: &str) -> String {
    format!("original_{queue}_")
}
