//! Recovery state persisted by the owning server between restarts.

use serde::{Deserialize, Deserializer, Serialize};

/// Startup mode the server last declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    #[default]
    Normal,
    Degraded,
    Maintenance,
    Migration,
}

impl RecoveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryMode::Normal => "normal",
            RecoveryMode::Degraded => "degraded",
            RecoveryMode::Maintenance => "maintenance",
            RecoveryMode::Migration => "migration",
        }
    }
}

impl std::fmt::Display for RecoveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of the recovery file.
///
/// Field names follow the file written by the server. Start times are unix
/// seconds; the `Readable*` lists carry the same instants as text. Lists may
/// be absent or `null` in the file.
///
/// Keys are matched exactly, except that `mode` is also accepted as `Mode`.
/// A file without a mode is malformed rather than read as normal mode: only a
/// missing file means normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryState {
    #[serde(alias = "Mode")]
    pub mode: RecoveryMode,
    #[serde(rename = "StartTimes", default, deserialize_with = "null_as_empty")]
    pub start_times: Vec<i64>,
    #[serde(rename = "ReadableStartTimes", default, deserialize_with = "null_as_empty")]
    pub readable_start_times: Vec<String>,
    #[serde(rename = "DegradedModeStartTimes", default, deserialize_with = "null_as_empty")]
    pub degraded_mode_start_times: Vec<i64>,
    #[serde(
        rename = "ReadableDegradedModeStartTimes",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub readable_degraded_mode_start_times: Vec<String>,
    #[serde(rename = "MaintenanceModeStartTimes", default, deserialize_with = "null_as_empty")]
    pub maintenance_mode_start_times: Vec<i64>,
    #[serde(
        rename = "ReadableMaintenanceModeStartTimes",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub readable_maintenance_mode_start_times: Vec<String>,
    #[serde(rename = "MigrationModeStartTimes", default, deserialize_with = "null_as_empty")]
    pub migration_mode_start_times: Vec<i64>,
    #[serde(
        rename = "ReadableMigrationModeStartTimes",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub readable_migration_mode_start_times: Vec<String>,
}

impl RecoveryState {
    /// State assumed when no recovery file exists.
    pub fn normal() -> Self {
        Self::default()
    }

    pub fn is_normal(&self) -> bool {
        self.mode == RecoveryMode::Normal
    }

    /// Start times recorded for the active mode.
    pub fn current_mode_start_times(&self) -> &[i64] {
        match self.mode {
            RecoveryMode::Normal => &self.start_times,
            RecoveryMode::Degraded => &self.degraded_mode_start_times,
            RecoveryMode::Maintenance => &self.maintenance_mode_start_times,
            RecoveryMode::Migration => &self.migration_mode_start_times,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
