//! Supervisor side: keep the worker alive and report its progress
//!
//! A [`Supervisor`] runs two independent loops per session:
//! - the [`Watchdog`], which relaunches the worker whenever no matching process is found
//! - the [`ProgressTailer`], which reports each newly checkpointed unit exactly once
//!
//! The loops share nothing but the stop signal. They never talk to the worker
//! directly; the checkpoint log is the only channel between them and it.

mod config;
mod events;
mod session;
mod signal;
mod tailer;
mod watchdog;


pub use config::{JobConfig, SupervisorSettings, DEFAULT_LIVENESS_INTERVAL, DEFAULT_TAIL_INTERVAL};
pub use events::{ConsoleObserver, Observer, SupervisorEvent};
pub use session::{SessionStatus, StartOutcome, Supervisor};
pub use signal::StopSignal;
pub use tailer::{ProgressTailer, TailState};
pub use watchdog::{TickOutcome, Watchdog};
