//! Worker-side half of checkpointing
//!
//! Runs inside the worker process. The only channel back to the supervisor is the
//! checkpoint log this module appends to.

mod hooks;
mod job;
mod log;
mod runtime;
mod writer;

pub use hooks::{CompletionHook, DeferredAction, LoadContext, LoadHandler};
pub use job::{JobFile, SimulatedWorker};
pub use log::CheckpointLog;
pub use runtime::{WorkControl, WorkerHost, WorkerRuntime};
pub use writer::CheckpointWriter;
