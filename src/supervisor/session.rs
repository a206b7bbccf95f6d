//! Supervision session: the Start/Stop state machine
//!
//! Start moves Idle -> Starting -> Running and launches the watchdog and tailer
//! threads together. Stop moves Running -> Stopping, signals both loops, waits for
//! them to finish their current iteration, and moves back to Idle.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use super::config::{JobConfig, SupervisorSettings};
use super::events::{emit, Observer, SupervisorEvent};
use super::signal::StopSignal;
use super::tailer::ProgressTailer;
use super::watchdog::Watchdog;
use crate::error::ConfigurationError;
use crate::process::{CommandSpawner, ProcessProbe, ProcessTable, Spawner};

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    /// Config is being validated and the loops launched
    Starting,
    Running,
    /// Stop is waiting for the loops to exit
    Stopping,
}

/// Result of a successful call to [`Supervisor::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running; nothing changed
    AlreadyRunning,
    /// The previous session has not finished stopping; nothing changed
    Stopping,
}

struct RunningSession {
    config: JobConfig,
    stop: StopSignal,
    watchdog: JoinHandle<()>,
    tailer: JoinHandle<()>,
}

enum SessionState {
    Idle,
    Starting,
    Running(RunningSession),
    Stopping(JobConfig),
}

/// Owns one supervision session at a time.
///
/// `start` and `stop` are the only ways to change state and may be called from
/// any thread. The state lock is never held while the observer runs or while
/// the loops are joined, so an observer may query the supervisor from `report`.
pub struct Supervisor {
    settings: SupervisorSettings,
    probe: Arc<dyn ProcessProbe>,
    spawner: Arc<dyn Spawner>,
    observer: Arc<dyn Observer>,
    state: Mutex<SessionState>,
}

impl Supervisor {
    /// Supervisor that watches the real process table and launches real processes.
    pub fn new(settings: SupervisorSettings, observer: Arc<dyn Observer>) -> Self {
        Self::with_backend(
            settings,
            observer,
            Arc::new(ProcessTable),
            Arc::new(CommandSpawner),
        )
    }

    pub fn with_backend(
        settings: SupervisorSettings,
        observer: Arc<dyn Observer>,
        probe: Arc<dyn ProcessProbe>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        Self {
            settings,
            probe,
            spawner,
            observer,
            state: Mutex::new(SessionState::Idle),
        }
    }

    /// Validate `config` and start supervising.
    ///
    /// On a configuration error the observer is told why, nothing is started, and
    /// the session stays idle.
    /// Calling this while a session is running or stopping reports it to the
    /// observer and changes nothing.
    pub fn start(&self, config: JobConfig) -> Result<StartOutcome, ConfigurationError> {
        let refused = {
            let mut state = self.lock_state();
            let refused = match &*state {
                SessionState::Idle => None,
                SessionState::Starting | SessionState::Running(_) => {
                    Some((SupervisorEvent::AlreadyRunning, StartOutcome::AlreadyRunning))
                }
                SessionState::Stopping(_) => {
                    Some((SupervisorEvent::StillStopping, StartOutcome::Stopping))
                }
            };
            if refused.is_none() {
                *state = SessionState::Starting;
            }
            refused
        };
        if let Some((event, outcome)) = refused {
            emit(self.observer.as_ref(), event);
            return Ok(outcome);
        }

        let config = match config.validated() {
            Ok(config) => config,
            Err(e) => {
                self.set_state(SessionState::Idle);
                emit(
                    self.observer.as_ref(),
                    SupervisorEvent::InvalidConfiguration {
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };
        let name_hint = self.settings.name_hint(&config);
        info!(
            worker = %config.worker_path.display(),
            job = %config.job_path.display(),
            log = %config.log_path.display(),
            hint = %name_hint,
            "Starting supervision"
        );

        emit(self.observer.as_ref(), SupervisorEvent::MonitoringStarted);

        let stop = StopSignal::new();

        let watchdog = Watchdog::new(
            config.clone(),
            name_hint,
            Arc::clone(&self.probe),
            Arc::clone(&self.spawner),
            Arc::clone(&self.observer),
        );
        let watchdog_stop = stop.clone();
        let liveness_interval = self.settings.liveness_interval;
        let watchdog = thread::spawn(move || watchdog.run(watchdog_stop, liveness_interval));

        let tailer = ProgressTailer::new(config.log_path.clone(), Arc::clone(&self.observer));
        let tailer_stop = stop.clone();
        let tail_interval = self.settings.tail_interval;
        let tailer = thread::spawn(move || tailer.run(tailer_stop, tail_interval));

        self.set_state(SessionState::Running(RunningSession {
            config,
            stop,
            watchdog,
            tailer,
        }));

        Ok(StartOutcome::Started)
    }

    /// Stop supervising. The worker process is left running.
    ///
    /// Returns once both loops have exited. Returns `false` if nothing was running.
    pub fn stop(&self) -> bool {
        let taken = {
            let mut state = self.lock_state();
            match mem::replace(&mut *state, SessionState::Idle) {
                SessionState::Running(session) => {
                    *state = SessionState::Stopping(session.config.clone());
                    Ok(session)
                }
                other => {
                    let event = if matches!(other, SessionState::Stopping(_)) {
                        SupervisorEvent::StillStopping
                    } else {
                        SupervisorEvent::NotRunning
                    };
                    *state = other;
                    Err(event)
                }
            }
        };
        let session = match taken {
            Ok(session) => session,
            Err(event) => {
                emit(self.observer.as_ref(), event);
                return false;
            }
        };

        session.stop.stop();
        if session.watchdog.join().is_err() {
            warn!("Watchdog loop panicked");
        }
        if session.tailer.join().is_err() {
            warn!("Tailer loop panicked");
        }
        self.set_state(SessionState::Idle);

        emit(self.observer.as_ref(), SupervisorEvent::MonitoringStopped);
        true
    }

    pub fn status(&self) -> SessionStatus {
        match *self.lock_state() {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Starting => SessionStatus::Starting,
            SessionState::Running(_) => SessionStatus::Running,
            SessionState::Stopping(_) => SessionStatus::Stopping,
        }
    }

    /// Config of the running (or stopping) session, if any
    pub fn config(&self) -> Option<JobConfig> {
        match &*self.lock_state() {
            SessionState::Idle | SessionState::Starting => None,
            SessionState::Running(session) => Some(session.config.clone()),
            SessionState::Stopping(config) => Some(config.clone()),
        }
    }

    fn set_state(&self, next: SessionState) {
        *self.lock_state() = next;
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if self.status() == SessionStatus::Running {
            self.stop();
        }
    }
}
