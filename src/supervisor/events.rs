//! Everything the supervisor tells its observer

use std::fmt;

use colored::Colorize;
use tracing::{info, warn};

use crate::checkpoint::{checkpoint_message, UnitId};

/// Events reported during a supervision session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    MonitoringStarted,
    MonitoringStopped,
    /// Start was called while a session was already running
    AlreadyRunning,
    /// Stop was called with no session running
    NotRunning,
    /// Start or Stop was called while the previous session was still stopping
    StillStopping,
    /// Start was rejected; nothing was started
    InvalidConfiguration {
        error: String,
    },
    /// Liveness check found no worker; a new one is being launched
    WorkerRestarting,
    WorkerRestarted {
        pid: u32,
    },
    RestartFailed {
        error: String,
    },
    /// A worker this supervisor launched has exited
    WorkerExited {
        pid: u32,
        status: String,
    },
    /// The process table could not be queried; no restart was attempted
    LivenessUnknown {
        error: String,
    },
    UnitCompleted {
        unit: UnitId,
    },
    LogReadFailed {
        error: String,
    },
}

impl SupervisorEvent {
    /// Whether this event signals something going wrong.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::RestartFailed { .. }
                | Self::LivenessUnknown { .. }
                | Self::LogReadFailed { .. }
        )
    }
}

impl fmt::Display for SupervisorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonitoringStarted => write!(f, "Monitoring started."),
            Self::MonitoringStopped => write!(f, "Monitoring stopped."),
            Self::AlreadyRunning => write!(f, "Monitoring is already running!"),
            Self::NotRunning => write!(f, "Monitoring is not running!"),
            Self::StillStopping => write!(f, "Monitoring is still stopping."),
            Self::InvalidConfiguration { error } => write!(f, "Invalid configuration: {error}"),
            Self::WorkerRestarting => write!(f, "Worker not running. Restarting worker..."),
            Self::WorkerRestarted { pid } => write!(f, "Worker started (pid {pid})."),
            Self::RestartFailed { error } => write!(f, "Failed to restart worker: {error}"),
            Self::WorkerExited { pid, status } => write!(f, "Worker (pid {pid}) exited: {status}"),
            Self::LivenessUnknown { error } => {
                write!(f, "Could not check whether the worker is running: {error}")
            }
            Self::UnitCompleted { unit } => write!(f, "{}", checkpoint_message(*unit)),
            Self::LogReadFailed { error } => write!(f, "Error reading rendered frames: {error}"),
        }
    }
}

/// Sink for supervisor messages. This is the core's only output channel.
pub trait Observer: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> Observer for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Prints each message on its own line, highlighting progress and problems.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn report(&self, message: &str) {
        if message.starts_with(crate::checkpoint::MARKER) {
            println!("{} {}", "✓".green().bold(), message);
        } else if ["Failed", "Error", "Invalid"]
            .iter()
            .any(|prefix| message.starts_with(prefix))
        {
            println!("{} {}", "✗".red().bold(), message);
        } else if message.starts_with("Could not") {
            println!("{} {}", "!".yellow().bold(), message);
        } else {
            println!("{} {}", "→".cyan().bold(), message);
        }
    }
}

/// Log `event` and hand its message to the observer.
pub(crate) fn emit(observer: &dyn Observer, event: SupervisorEvent) {
    let message = event.to_string();
    if event.is_problem() {
        warn!("{message}");
    } else {
        info!("{message}");
    }
    observer.report(&message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_message_matches_log_marker() {
        let event = SupervisorEvent::UnitCompleted { unit: 12 };
        assert_eq!(event.to_string(), "Rendered Frame: 12");
    }

    #[test]
    fn test_session_messages() {
        assert_eq!(SupervisorEvent::MonitoringStarted.to_string(), "Monitoring started.");
        assert_eq!(SupervisorEvent::MonitoringStopped.to_string(), "Monitoring stopped.");
        assert_eq!(
            SupervisorEvent::AlreadyRunning.to_string(),
            "Monitoring is already running!"
        );
        assert_eq!(SupervisorEvent::NotRunning.to_string(), "Monitoring is not running!");
        assert_eq!(
            SupervisorEvent::StillStopping.to_string(),
            "Monitoring is still stopping."
        );
    }

    #[test]
    fn test_problem_classification() {
        assert!(SupervisorEvent::LivenessUnknown {
            error: "x".into()
        }
        .is_problem());
        assert!(!SupervisorEvent::WorkerRestarting.is_problem());
        assert!(!SupervisorEvent::UnitCompleted { unit: 1 }.is_problem());
    }

    #[test]
    fn test_closure_observer_receives_message() {
        let messages = Mutex::new(Vec::new());
        let observer = |m: &str| messages.lock().unwrap().push(m.to_string());

        emit(&observer, SupervisorEvent::WorkerRestarting);

        assert_eq!(
            *messages.lock().unwrap(),
            vec!["Worker not running. Restarting worker...".to_string()]
        );
    }
}
