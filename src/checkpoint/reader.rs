//! Reading checkpoints back out of the log
//!
//! Two readers share the line grammar from [`super::record`]:
//! - [`resume_point`] scans the whole log backwards and returns the id of the last
//!   checkpoint written, falling back to [`DEFAULT_RESUME_POINT`].
//! - [`LogCursor`] reads forward from a saved byte offset and only consumes complete
//!   lines, so a tailer can pick up appended checkpoints without re-scanning the file.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use super::record::{CheckpointRecord, UnitId};
use crate::error::PersistenceError;

/// Resume point used when the log is missing, unreadable, or has no checkpoint.
pub const DEFAULT_RESUME_POINT: UnitId = 1;

/// Unit id the worker should resume from.
///
/// Never fails: read errors are logged and resolve to [`DEFAULT_RESUME_POINT`].
pub fn resume_point(log_path: &Path) -> UnitId {
    match last_checkpoint(log_path) {
        Ok(Some(unit)) => unit,
        Ok(None) => DEFAULT_RESUME_POINT,
        Err(e) => {
            warn!(path = %log_path.display(), "Error reading log file: {e}");
            DEFAULT_RESUME_POINT
        }
    }
}

/// Unit id of the last checkpoint line in the log, or `None` if there is none.
///
/// A missing file is not an error.
pub fn last_checkpoint(log_path: &Path) -> Result<Option<UnitId>, PersistenceError> {
    let bytes = match std::fs::read(log_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistenceError::read(log_path, e)),
    };

    Ok(last_checkpoint_in(&String::from_utf8_lossy(&bytes)))
}

/// Scan `content` from the end and return the first checkpoint found.
///
/// The last line written wins even when an earlier line carries a larger id.
/// Malformed marker lines are skipped rather than ending the scan.
pub fn last_checkpoint_in(content: &str) -> Option<UnitId> {
    content
        .lines()
        .rev()
        .find_map(CheckpointRecord::parse)
        .map(|record| record.unit_id)
}

/// All checkpoints in `content`, in file order.
pub fn scan_records(content: &str) -> impl Iterator<Item = CheckpointRecord> + '_ {
    content.lines().filter_map(CheckpointRecord::parse)
}

/// Byte offset into the checkpoint log, advanced past each complete line consumed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogCursor {
    offset: u64,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read checkpoints appended since the last call.
    ///
    /// A trailing line without a newline is left for the next call, so a line
    /// being written concurrently is never parsed half-finished. If the file is
    /// shorter than the cursor it was replaced; reading restarts from the top.
    /// A missing file yields no records.
    pub fn read_new(&mut self, log_path: &Path) -> Result<Vec<CheckpointRecord>, PersistenceError> {
        let mut file = match File::open(log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::read(log_path, e)),
        };

        let len = file
            .metadata()
            .map_err(|e| PersistenceError::read(log_path, e))?
            .len();
        if len < self.offset {
            warn!(
                path = %log_path.display(),
                offset = self.offset,
                len,
                "Log file shrank, rereading from the start"
            );
            self.offset = 0;
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))
            .map_err(|e| PersistenceError::read(log_path, e))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| PersistenceError::read(log_path, e))?;

        let complete = match buf.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None => {
                debug!(path = %log_path.display(), "Only a partial line available");
                return Ok(Vec::new());
            }
        };

        self.offset += complete as u64;
        let text = String::from_utf8_lossy(&buf[..complete]);
        Ok(scan_records(&text).collect())
    }
}
