//! Checkpoint line format
//!
//! A checkpoint is any log line containing [`MARKER`] followed by an integer unit id.
//! Whatever precedes the marker (normally a timestamp) is kept as advisory text only.

use chrono::{DateTime, Local};

/// Literal that identifies a checkpoint line.
pub const MARKER: &str = "Rendered Frame:";

/// Timestamp layout used for every line the worker appends.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Identifier of one unit of work (a frame number).
pub type UnitId = u64;

/// A single completed-unit marker read back from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRecord {
    /// Text before the marker with the `" - "` separator stripped, if any
    pub timestamp: Option<String>,
    pub unit_id: UnitId,
}

impl CheckpointRecord {
    /// Parse one log line. Returns `None` for unrelated text and for marker lines whose
    /// id does not parse (including a line cut short by a concurrent append).
    pub fn parse(line: &str) -> Option<Self> {
        let (prefix, rest) = line.split_once(MARKER)?;
        let id_text = rest.split(MARKER).next().unwrap_or(rest).trim();
        let unit_id = id_text.parse::<UnitId>().ok()?;

        let prefix = prefix.trim().trim_end_matches('-').trim_end();
        let timestamp = (!prefix.is_empty()).then(|| prefix.to_string());

        Some(Self { timestamp, unit_id })
    }
}

impl std::fmt::Display for CheckpointRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.timestamp {
            Some(ts) => write!(f, "{ts} - {MARKER} {}", self.unit_id),
            None => write!(f, "{MARKER} {}", self.unit_id),
        }
    }
}

/// Format a log line with the worker's timestamp prefix, without the trailing newline.
pub fn format_log_line(at: DateTime<Local>, message: &str) -> String {
    format!("{} - {message}", at.format(TIMESTAMP_FORMAT))
}

/// Format the checkpoint message for a completed unit.
pub fn checkpoint_message(unit_id: UnitId) -> String {
    format!("{MARKER} {unit_id}")
}
