//! Job configuration and supervisor timing

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Interval between worker liveness checks
pub const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(10);

/// Interval between checkpoint log reads
pub const DEFAULT_TAIL_INTERVAL: Duration = Duration::from_secs(2);

/// What to supervise: the worker, the job it is launched with, and the log it writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub worker_path: PathBuf,
    pub job_path: PathBuf,
    pub log_path: PathBuf,
}

impl JobConfig {
    pub fn new(
        worker_path: impl Into<PathBuf>,
        job_path: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            worker_path: worker_path.into(),
            job_path: job_path.into(),
            log_path: log_path.into(),
        }
    }

    /// Check every path and return the config with the worker resolved to a real file.
    ///
    /// A bare worker name such as `blender` is looked up on `PATH`. The log file
    /// itself may not exist yet, but its directory must.
    pub fn validated(&self) -> Result<JobConfig, ConfigurationError> {
        if self.worker_path.as_os_str().is_empty() {
            return Err(ConfigurationError::EmptyPath("worker executable"));
        }
        if self.job_path.as_os_str().is_empty() {
            return Err(ConfigurationError::EmptyPath("job file"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigurationError::EmptyPath("log file"));
        }

        let worker_path = resolve_executable(&self.worker_path)
            .ok_or_else(|| ConfigurationError::WorkerNotFound(self.worker_path.clone()))?;

        if !self.job_path.is_file() {
            return Err(ConfigurationError::JobNotFound(self.job_path.clone()));
        }

        let log_dir = log_dir(&self.log_path);
        if !log_dir.is_dir() {
            return Err(ConfigurationError::LogDirMissing(log_dir.to_path_buf()));
        }

        Ok(JobConfig {
            worker_path,
            job_path: self.job_path.clone(),
            log_path: self.log_path.clone(),
        })
    }
}

fn resolve_executable(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.components().count() == 1 {
        return which::which(path).ok();
    }
    None
}

fn log_dir(log_path: &Path) -> &Path {
    match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Timing and process matching for a supervision session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub liveness_interval: Duration,
    pub tail_interval: Duration,
    /// Process name to look for; defaults to the worker executable's file stem
    pub process_name: Option<String>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            liveness_interval: DEFAULT_LIVENESS_INTERVAL,
            tail_interval: DEFAULT_TAIL_INTERVAL,
            process_name: None,
        }
    }
}

impl SupervisorSettings {
    /// Name hint used to find the worker in the process table.
    pub fn name_hint(&self, config: &JobConfig) -> String {
        if let Some(name) = self.process_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        config
            .worker_path
            .file_stem()
            .or_else(|| config.worker_path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.worker_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        config: JobConfig,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let worker = temp.path().join("worker.exe");
        let job = temp.path().join("scene.toml");
        fs::write(&worker, "").unwrap();
        fs::write(&job, "").unwrap();
        let config = JobConfig::new(&worker, &job, temp.path().join("render_log.txt"));
        Fixture {
            _temp: temp,
            config,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let fx = fixture();
        let validated = fx.config.validated().unwrap();
        assert_eq!(validated, fx.config);
    }

    #[test]
    fn test_missing_worker_is_rejected() {
        let fx = fixture();
        let mut config = fx.config.clone();
        config.worker_path = config.worker_path.with_file_name("missing.exe");
        assert!(matches!(
            config.validated(),
            Err(ConfigurationError::WorkerNotFound(_))
        ));
    }

    #[test]
    fn test_missing_job_is_rejected() {
        let fx = fixture();
        let mut config = fx.config.clone();
        config.job_path = config.job_path.with_file_name("missing.toml");
        assert!(matches!(
            config.validated(),
            Err(ConfigurationError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_missing_log_dir_is_rejected() {
        let fx = fixture();
        let mut config = fx.config.clone();
        config.log_path = config.log_path.with_file_name("nope").join("render.log");
        assert!(matches!(
            config.validated(),
            Err(ConfigurationError::LogDirMissing(_))
        ));
    }

    #[test]
    fn test_empty_paths_are_rejected() {
        let config = JobConfig::new("", "job", "log");
        assert!(matches!(
            config.validated(),
            Err(ConfigurationError::EmptyPath("worker executable"))
        ));
    }

    #[test]
    fn test_bare_worker_name_resolves_on_path() {
        let fx = fixture();
        let mut config = fx.config.clone();
        config.worker_path = PathBuf::from("sh");
        let validated = config.validated().unwrap();
        assert!(validated.worker_path.is_absolute());
    }

    #[test]
    fn test_name_hint_defaults_to_file_stem() {
        let settings = SupervisorSettings::default();
        let config = JobConfig::new("/opt/blender/blender.exe", "a", "b");
        assert_eq!(settings.name_hint(&config), "blender");
    }

    #[test]
    fn test_name_hint_override() {
        let settings = SupervisorSettings {
            process_name: Some("render-node".to_string()),
            ..Default::default()
        };
        let config = JobConfig::new("/opt/blender/blender", "a", "b");
        assert_eq!(settings.name_hint(&config), "render-node");
    }
}
