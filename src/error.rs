//! Error taxonomy for the supervision core.
//!
//! Only [`ConfigurationError`] ever reaches a caller of the session API. The other
//! kinds are recovered where they occur: logged, reported to the observer, and the
//! loop that hit them carries on with its next interval.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid job configuration detected by `Start`. No state changes when this is returned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("No {0} path given")]
    EmptyPath(&'static str),

    #[error("Worker executable not found: {}", .0.display())]
    WorkerNotFound(PathBuf),

    #[error("Job file not found: {}", .0.display())]
    JobNotFound(PathBuf),

    #[error("Log directory does not exist: {}", .0.display())]
    LogDirMissing(PathBuf),
}

/// Failure reading or writing the checkpoint log or the recent-paths record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// The process table could not be queried. Distinct from "worker not running".
#[derive(Debug, Error)]
pub enum LivenessQueryError {
    #[error("Failed to list processes: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process listing command failed: {0}")]
    Command(String),
}

/// The worker process could not be launched.
#[derive(Debug, Error)]
#[error("Failed to launch {}: {source}", executable.display())]
pub struct SpawnError {
    pub executable: PathBuf,
    #[source]
    pub source: std::io::Error,
}
