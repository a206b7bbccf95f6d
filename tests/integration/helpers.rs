//! Shared fixtures for the integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use relaunch::supervisor::Observer;

/// Observer that keeps every message it is given
#[derive(Default)]
pub struct CollectingObserver {
    messages: Mutex<Vec<String>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Unit ids from progress messages, in the order they were reported
    pub fn progress(&self) -> Vec<u64> {
        self.messages()
            .iter()
            .filter_map(|m| m.strip_prefix("Rendered Frame: "))
            .map(|n| n.parse().expect("progress message should carry a unit id"))
            .collect()
    }
}

impl Observer for CollectingObserver {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Temp directory holding a job file and the log it points at
pub struct JobDir {
    pub temp: TempDir,
    pub job_path: PathBuf,
    pub log_path: PathBuf,
}

impl JobDir {
    /// `extra` is appended to the job file after `log_path`.
    pub fn new(extra: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp.path().join("render_log.txt");
        let job_path = temp.path().join("job.toml");
        fs::write(
            &job_path,
            format!("log_path = {:?}\n{}", log_path.display().to_string(), extra),
        )
        .expect("Failed to write job file");
        Self {
            temp,
            job_path,
            log_path,
        }
    }

    pub fn log_content(&self) -> String {
        fs::read_to_string(&self.log_path).unwrap_or_default()
    }
}

/// Unit ids of the checkpoint lines in `log_path`, in file order
pub fn checkpoint_ids(log_path: &Path) -> Vec<u64> {
    let content = fs::read_to_string(log_path).unwrap_or_default();
    relaunch::checkpoint::scan_records(&content)
        .map(|record| record.unit_id)
        .collect()
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
