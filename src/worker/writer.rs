//! Checkpoint writer embedded in the worker
//!
//! On every job load the writer clears the worker's hooks, registers a completion
//! hook that appends one checkpoint line per finished unit, and schedules a begin
//! action that resumes from the last checkpoint already in the log.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::checkpoint::{checkpoint_message, resume_point, UnitId};
use crate::error::PersistenceError;

use super::hooks::{LoadContext, LoadHandler};
use super::log::CheckpointLog;
use super::runtime::WorkControl;

pub struct CheckpointWriter {
    log: Arc<CheckpointLog>,
}

impl CheckpointWriter {
    /// Open (and if needed create) the checkpoint log at `log_path`.
    pub fn open(log_path: &Path) -> Result<Self, PersistenceError> {
        let log = CheckpointLog::open(log_path)?;
        log.append("Logging initialized.")?;
        info!(path = %log_path.display(), "Logging checkpoints");
        Ok(Self { log: Arc::new(log) })
    }
}

impl LoadHandler for CheckpointWriter {
    fn on_job_loaded(&mut self, ctx: &mut LoadContext<'_>) {
        ctx.clear();

        let log = Arc::clone(&self.log);
        ctx.set_completion_hook(Box::new(move |unit: UnitId| {
            if let Err(e) = log.append(&checkpoint_message(unit)) {
                error!(unit, "Failed to record checkpoint: {e}");
            }
        }));

        let log = Arc::clone(&self.log);
        ctx.schedule_begin(Box::new(move |work: &mut WorkControl<'_>| {
            let start = resume_point(log.path());
            if let Err(e) = log.append(&format!("Resuming from frame: {start}")) {
                error!("Failed to write resume line: {e}");
            }
            info!(unit = start, "Resuming");
            work.set_start_unit(start);
            work.begin()
        }));
    }
}
