//! Worker liveness loop
//!
//! Every interval the watchdog asks the process table whether a worker is
//! running and launches one if it is not. It keeps no resume state of its own:
//! a relaunched worker finds its resume point in the checkpoint log.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::config::JobConfig;
use super::events::{emit, Observer, SupervisorEvent};
use super::signal::StopSignal;
use crate::process::{ProcessProbe, Spawner, WorkerHandle};

/// What one liveness check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Alive,
    Restarted { pid: u32 },
    RestartFailed,
    /// The process table query failed; nothing was launched
    Unknown,
}

pub struct Watchdog {
    config: JobConfig,
    name_hint: String,
    probe: Arc<dyn ProcessProbe>,
    spawner: Arc<dyn Spawner>,
    observer: Arc<dyn Observer>,
    children: Vec<WorkerHandle>,
}

impl Watchdog {
    pub fn new(
        config: JobConfig,
        name_hint: String,
        probe: Arc<dyn ProcessProbe>,
        spawner: Arc<dyn Spawner>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            config,
            name_hint,
            probe,
            spawner,
            observer,
            children: Vec::new(),
        }
    }

    /// Run one liveness check, relaunching the worker if none is running.
    pub fn tick(&mut self) -> TickOutcome {
        self.reap_exited();

        match self.probe.is_running(&self.name_hint) {
            Ok(true) => {
                debug!(hint = %self.name_hint, "Worker is running");
                TickOutcome::Alive
            }
            Ok(false) => self.restart(),
            Err(e) => {
                emit(
                    self.observer.as_ref(),
                    SupervisorEvent::LivenessUnknown {
                        error: e.to_string(),
                    },
                );
                TickOutcome::Unknown
            }
        }
    }

    /// Check every `interval` until `stop` is signalled.
    pub fn run(mut self, stop: StopSignal, interval: Duration) {
        debug!(hint = %self.name_hint, ?interval, "Watchdog loop started");
        while !stop.is_stopped() {
            self.tick();
            if stop.wait(interval) {
                break;
            }
        }
        self.reap_exited();
        debug!("Watchdog loop exited");
    }

    /// Workers launched by this watchdog that have not been reaped yet
    pub fn live_children(&self) -> usize {
        self.children.len()
    }

    fn restart(&mut self) -> TickOutcome {
        emit(self.observer.as_ref(), SupervisorEvent::WorkerRestarting);

        let args = [OsString::from(self.config.job_path.as_os_str())];
        match self.spawner.spawn(&self.config.worker_path, &args) {
            Ok(handle) => {
                let pid = handle.pid();
                if handle.is_reapable() {
                    self.children.push(handle);
                }
                emit(
                    self.observer.as_ref(),
                    SupervisorEvent::WorkerRestarted { pid },
                );
                TickOutcome::Restarted { pid }
            }
            Err(e) => {
                emit(
                    self.observer.as_ref(),
                    SupervisorEvent::RestartFailed {
                        error: e.to_string(),
                    },
                );
                TickOutcome::RestartFailed
            }
        }
    }

    fn reap_exited(&mut self) {
        let observer = Arc::clone(&self.observer);
        self.children.retain_mut(|child| match child.try_reap() {
            Some(status) => {
                emit(
                    observer.as_ref(),
                    SupervisorEvent::WorkerExited {
                        pid: child.pid(),
                        status: status.to_string(),
                    },
                );
                false
            }
            None => child.is_reapable(),
        });
    }
}
