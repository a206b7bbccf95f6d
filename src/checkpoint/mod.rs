//! Checkpoint log format and readers
//!
//! The checkpoint log is an append-only text file shared between the worker, which
//! writes one line per completed unit, and the supervisor, which reads it back.

mod reader;
mod record;

pub use reader::{
    last_checkpoint, last_checkpoint_in, resume_point, scan_records, LogCursor,
    DEFAULT_RESUME_POINT,
};
pub use record::{
    checkpoint_message, format_log_line, CheckpointRecord, UnitId, MARKER, TIMESTAMP_FORMAT,
};
