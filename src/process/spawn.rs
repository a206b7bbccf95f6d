//! Launching worker processes

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::SpawnError;

/// Launches a worker process.
pub trait Spawner: Send + Sync {
    fn spawn(&self, executable: &Path, args: &[OsString]) -> Result<WorkerHandle, SpawnError>;
}

/// [`Spawner`] that starts a real OS process.
///
/// The worker gets its own process group so a Ctrl-C aimed at the supervisor
/// does not also take the worker down. Its stdout and stderr are discarded;
/// everything the supervisor needs comes through the checkpoint log.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandSpawner;

impl Spawner for CommandSpawner {
    fn spawn(&self, executable: &Path, args: &[OsString]) -> Result<WorkerHandle, SpawnError> {
        let child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| SpawnError {
                executable: executable.to_path_buf(),
                source,
            })?;

        debug!(pid = child.id(), executable = %executable.display(), "Spawned worker");
        Ok(WorkerHandle::from_child(child))
    }
}

/// A worker this supervisor launched.
///
/// Holding on to the [`Child`] lets the supervisor reap it once it exits, so it
/// does not linger in the process table as a zombie.
#[derive(Debug)]
pub struct WorkerHandle {
    pid: u32,
    child: Option<Child>,
}

impl WorkerHandle {
    pub fn from_child(child: Child) -> Self {
        Self {
            pid: child.id(),
            child: Some(child),
        }
    }

    /// Handle for a process that cannot be waited on (used by test spawners).
    pub fn detached(pid: u32) -> Self {
        Self { pid, child: None }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Collect the exit status if the process has finished. Never blocks.
    ///
    /// Returns `Some` exactly once per handle; detached handles always return `None`.
    pub fn try_reap(&mut self) -> Option<ExitStatus> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                self.child = None;
                Some(status)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(pid = self.pid, "Failed to poll worker status: {e}");
                None
            }
        }
    }

    /// Whether the handle still refers to a process that has not been reaped.
    pub fn is_reapable(&self) -> bool {
        self.child.is_some()
    }
}
