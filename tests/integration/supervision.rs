//! The supervisor against a real worker process

use std::ffi::OsString;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serial_test::serial;

use relaunch::error::{LivenessQueryError, SpawnError};
use relaunch::process::{is_process_alive, CommandSpawner, ProcessProbe, Spawner, WorkerHandle};
use relaunch::supervisor::{JobConfig, SessionStatus, StartOutcome, Supervisor, SupervisorSettings};

use super::helpers::*;

/// Launches real processes and remembers their pids
#[derive(Default)]
struct TrackingSpawner {
    pids: Arc<Mutex<Vec<u32>>>,
}

impl Spawner for TrackingSpawner {
    fn spawn(&self, executable: &Path, args: &[OsString]) -> Result<WorkerHandle, SpawnError> {
        let handle = CommandSpawner.spawn(executable, args)?;
        self.pids.lock().unwrap().push(handle.pid());
        Ok(handle)
    }
}

/// Considers the worker running while any process the spawner launched is alive.
///
/// Scanning the whole process table would also see workers from other tests.
struct TrackedProbe {
    pids: Arc<Mutex<Vec<u32>>>,
}

impl ProcessProbe for TrackedProbe {
    fn is_running(&self, _name_hint: &str) -> Result<bool, LivenessQueryError> {
        Ok(self.pids.lock().unwrap().iter().any(|&pid| is_process_alive(pid)))
    }
}

fn kill_all(pids: &Mutex<Vec<u32>>) {
    for &pid in pids.lock().unwrap().iter() {
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

fn supervisor(observer: Arc<CollectingObserver>) -> (Supervisor, Arc<Mutex<Vec<u32>>>) {
    let spawner = TrackingSpawner::default();
    let pids = Arc::clone(&spawner.pids);
    let settings = SupervisorSettings {
        liveness_interval: Duration::from_millis(50),
        tail_interval: Duration::from_millis(20),
        process_name: None,
    };
    let sup = Supervisor::with_backend(
        settings,
        observer,
        Arc::new(TrackedProbe {
            pids: Arc::clone(&pids),
        }),
        Arc::new(spawner),
    );
    (sup, pids)
}

#[test]
#[serial]
fn test_supervisor_restarts_crashing_worker_until_job_completes() {
    let job_dir = JobDir::new("end = 6\nunit_millis = 10\nfail_after = 2\n");
    let observer = CollectingObserver::new();
    let (sup, pids) = supervisor(observer.clone());

    let config = JobConfig::new(
        env!("CARGO_BIN_EXE_relaunch-worker"),
        &job_dir.job_path,
        &job_dir.log_path,
    );
    assert_eq!(sup.start(config).unwrap(), StartOutcome::Started);

    let finished = wait_until(Duration::from_secs(20), || observer.progress().contains(&6));
    assert!(sup.stop());
    kill_all(&pids);

    assert!(finished, "worker never reached the last unit: {:?}", observer.messages());
    assert_eq!(observer.progress(), vec![1, 2, 3, 4, 5, 6]);

    // Each run does two units and the last checkpointed unit is redone on resume.
    assert_eq!(
        checkpoint_ids(&job_dir.log_path),
        vec![1, 2, 2, 3, 3, 4, 4, 5, 5, 6]
    );
    assert_eq!(pids.lock().unwrap().len(), 5);

    let messages = observer.messages();
    assert_eq!(messages.first().map(String::as_str), Some("Monitoring started."));
    assert_eq!(messages.last().map(String::as_str), Some("Monitoring stopped."));
    assert_eq!(
        messages
            .iter()
            .filter(|m| *m == "Worker not running. Restarting worker...")
            .count(),
        5
    );
}

#[test]
#[serial]
fn test_stop_leaves_worker_running() {
    let job_dir = JobDir::new("end = 1000\nunit_millis = 20\n");
    let observer = CollectingObserver::new();
    let (sup, pids) = supervisor(observer.clone());

    let config = JobConfig::new(
        env!("CARGO_BIN_EXE_relaunch-worker"),
        &job_dir.job_path,
        &job_dir.log_path,
    );
    sup.start(config).unwrap();
    assert!(wait_until(Duration::from_secs(10), || !observer.progress().is_empty()));
    assert!(sup.stop());
    assert_eq!(sup.status(), SessionStatus::Idle);

    let launched = pids.lock().unwrap().clone();
    assert_eq!(launched.len(), 1);
    assert!(is_process_alive(launched[0]));

    // No loop is left to notice the kill.
    kill_all(&pids);
    let reported = observer.messages().len();
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(observer.messages().len(), reported);
}

#[test]
fn test_start_with_missing_job_file_is_rejected() {
    let job_dir = JobDir::new("end = 1\n");
    let observer = CollectingObserver::new();
    let (sup, pids) = supervisor(observer.clone());

    let config = JobConfig::new(
        env!("CARGO_BIN_EXE_relaunch-worker"),
        job_dir.temp.path().join("missing.toml"),
        &job_dir.log_path,
    );
    assert!(sup.start(config).is_err());
    assert_eq!(sup.status(), SessionStatus::Idle);
    assert!(pids.lock().unwrap().is_empty());
    assert!(observer.messages()[0].starts_with("Invalid configuration:"));
}
