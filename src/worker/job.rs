//! Reference worker: a TOML job file and a host that simulates per-unit work

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::checkpoint::UnitId;

use super::runtime::WorkerHost;

fn default_start() -> UnitId {
    1
}

fn default_unit_millis() -> u64 {
    500
}

fn default_hold_on_finish() -> bool {
    true
}

/// Job file consumed by `relaunch-worker`.
///
/// ```toml
/// log_path = "/var/log/render/render_log.txt"
/// start = 1
/// end = 250
/// unit_millis = 500
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JobFile {
    pub log_path: PathBuf,
    #[serde(default = "default_start")]
    pub start: UnitId,
    pub end: UnitId,
    /// Simulated time spent on each unit
    #[serde(default = "default_unit_millis")]
    pub unit_millis: u64,
    /// Fail after this many units in one run (for exercising crash recovery)
    #[serde(default)]
    pub fail_after: Option<u32>,
    /// Keep the process alive after the last unit, as an interactive worker would
    #[serde(default = "default_hold_on_finish")]
    pub hold_on_finish: bool,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid job file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let job: JobFile = toml::from_str(content).context("Failed to parse job TOML")?;
        if job.end < job.start {
            bail!("end ({}) is before start ({})", job.end, job.start);
        }
        Ok(job)
    }
}

/// Host that "processes" units by sleeping for `unit_millis` each.
#[derive(Debug)]
pub struct SimulatedWorker {
    job: JobFile,
    start: UnitId,
    completed: u32,
}

impl SimulatedWorker {
    pub fn new(job: JobFile) -> Self {
        Self {
            start: job.start,
            job,
            completed: 0,
        }
    }

    /// Units completed by this process so far
    pub fn completed(&self) -> u32 {
        self.completed
    }
}

impl WorkerHost for SimulatedWorker {
    /// Units before the job's own `start` are never processed.
    fn set_start_unit(&mut self, unit: UnitId) {
        self.start = unit.max(self.job.start);
    }

    fn start_unit(&self) -> UnitId {
        self.start
    }

    fn process(&mut self, on_complete: &mut dyn FnMut(UnitId)) -> Result<()> {
        if self.start > self.job.end {
            info!(start = self.start, end = self.job.end, "Nothing left to process");
            return Ok(());
        }

        let unit_time = Duration::from_millis(self.job.unit_millis);
        for unit in self.start..=self.job.end {
            if self.job.fail_after == Some(self.completed) {
                bail!("Simulated failure while processing unit {unit}");
            }
            thread::sleep(unit_time);
            self.completed += 1;
            debug!(unit, "Unit complete");
            on_complete(unit);
        }

        info!(end = self.job.end, "All units processed");
        Ok(())
    }
}
