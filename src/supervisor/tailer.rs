//! Progress reporting from the checkpoint log
//!
//! Each interval the tailer reads whatever was appended to the log since the
//! last pass and reports every unit it has not reported before, in file order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::events::{emit, Observer, SupervisorEvent};
use super::signal::StopSignal;
use crate::checkpoint::{LogCursor, UnitId};
use crate::error::PersistenceError;

/// Read position plus the set of units already reported this session.
#[derive(Debug, Default)]
pub struct TailState {
    cursor: LogCursor,
    seen: HashSet<UnitId>,
}

impl TailState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units not seen before, in the order they appear in newly read lines.
    pub fn poll(&mut self, log_path: &Path) -> Result<Vec<UnitId>, PersistenceError> {
        let records = self.cursor.read_new(log_path)?;
        Ok(records
            .into_iter()
            .map(|r| r.unit_id)
            .filter(|unit| self.seen.insert(*unit))
            .collect())
    }

    pub fn has_seen(&self, unit: UnitId) -> bool {
        self.seen.contains(&unit)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

pub struct ProgressTailer {
    log_path: PathBuf,
    observer: Arc<dyn Observer>,
    state: TailState,
}

impl ProgressTailer {
    pub fn new(log_path: PathBuf, observer: Arc<dyn Observer>) -> Self {
        Self {
            log_path,
            observer,
            state: TailState::new(),
        }
    }

    /// Read once and report new units. Returns how many were reported.
    pub fn tick(&mut self) -> usize {
        match self.state.poll(&self.log_path) {
            Ok(units) => {
                for &unit in &units {
                    emit(self.observer.as_ref(), SupervisorEvent::UnitCompleted { unit });
                }
                units.len()
            }
            Err(e) => {
                emit(
                    self.observer.as_ref(),
                    SupervisorEvent::LogReadFailed {
                        error: e.to_string(),
                    },
                );
                0
            }
        }
    }

    /// Read every `interval` until `stop` is signalled.
    pub fn run(mut self, stop: StopSignal, interval: Duration) {
        debug!(path = %self.log_path.display(), ?interval, "Tailer loop started");
        while !stop.is_stopped() {
            self.tick();
            if stop.wait(interval) {
                break;
            }
        }
        debug!(reported = self.state.seen_count(), "Tailer loop exited");
    }

    pub fn state(&self) -> &TailState {
        &self.state
    }
}
