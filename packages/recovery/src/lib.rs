//! Loading of the server's persisted recovery state.
//!
//! The server records which startup mode it last declared in a small JSON
//! file. A missing file means the server never left normal mode; a file that
//! exists but cannot be read or parsed is an error, never a silent `normal`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jobsdb_core::RecoveryState;
use tokio::fs;

/// Recovery file errors.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed recovery file {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the recovery state stored at `path`.
///
/// Returns [`RecoveryState::normal`] when the file does not exist.
pub async fn load_recovery_state(path: impl AsRef<Path>) -> Result<RecoveryState, RecoveryError> {
    let path = path.as_ref();

    let json = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No recovery file at {:?}, assuming normal mode", path);
            return Ok(RecoveryState::normal());
        }
        Err(source) => {
            return Err(RecoveryError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let state: RecoveryState =
        serde_json::from_slice(&json).map_err(|source| RecoveryError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("Loaded recovery state from {:?}: {}", path, state.mode);

    Ok(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use jobsdb_core::RecoveryMode;

    #[tokio::test]
    async fn missing_file_is_normal_mode() -> Result<(), RecoveryError> {
        let state = load_recovery_state("/nonexistent/recovery_data.json").await?;
        assert_eq!(state.mode, RecoveryMode::Normal);
        assert_eq!(state, RecoveryState::default());
        Ok(())
    }

    #[tokio::test]
    async fn reads_mode_and_start_times() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recovery_data.json");
        std::fs::write(
            &path,
            r#"{"mode":"maintenance","MaintenanceModeStartTimes":[1700000000],"StartTimes":null}"#,
        )?;

        let state = load_recovery_state(&path).await?;
        assert_eq!(state.mode, RecoveryMode::Maintenance);
        assert_eq!(state.current_mode_start_times(), &[1700000000]);
        assert!(state.start_times.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;

        let truncated = dir.path().join("truncated.json");
        std::fs::write(&truncated, r#"{"mode":"degr"#)?;
        let result = load_recovery_state(&truncated).await;
        assert!(matches!(result, Err(RecoveryError::Malformed { .. })));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "")?;
        let result = load_recovery_state(&empty).await;
        assert!(matches!(result, Err(RecoveryError::Malformed { .. })));

        let unknown_mode = dir.path().join("unknown.json");
        std::fs::write(&unknown_mode, r#"{"mode":"recovering"}"#)?;
        let result = load_recovery_state(&unknown_mode).await;
        assert!(matches!(result, Err(RecoveryError::Malformed { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // A directory exists but cannot be read as a file.
        let result = load_recovery_state(dir.path()).await;
        assert!(matches!(result, Err(RecoveryError::Io { .. })));
        Ok(())
    }
}
