//! Process utilities for the supervisor
//!
//! Liveness is checked two ways: by PID with a null signal, and by scanning the
//! process table for any process whose name matches a hint. The supervisor uses
//! the name scan, so a worker started outside relaunch also counts as running.

mod spawn;
mod table;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

pub use spawn::{CommandSpawner, Spawner, WorkerHandle};
pub use table::{ProcessProbe, ProcessTable};

/// Check if a process with the given PID exists
///
/// Sends the null signal. `EPERM` means the process exists but belongs to
/// someone else, so it counts as alive; `ESRCH` means it is gone.
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };

    match kill(Pid::from_raw(pid_i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => false,
    }
}
