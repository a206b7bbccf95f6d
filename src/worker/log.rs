//! Append-only checkpoint log handle used inside the worker process

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::debug;

use crate::checkpoint::format_log_line;
use crate::error::PersistenceError;

/// Shared append handle on the checkpoint log.
///
/// Each line goes out in a single unbuffered write followed by a flush, so a
/// crash after `append` returns cannot lose it.
#[derive(Debug)]
pub struct CheckpointLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl CheckpointLog {
    /// Open the log for appending, creating its parent directory if needed.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| PersistenceError::write(dir, e))?;
                debug!(dir = %dir.display(), "Created log directory");
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PersistenceError::write(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line.
    pub fn append(&self, message: &str) -> Result<(), PersistenceError> {
        let mut line = format_log_line(Local::now(), message);
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| PersistenceError::write(&self.path, e))
    }
}
