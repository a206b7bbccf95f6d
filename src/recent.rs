//! Recently used paths, offered as defaults on the next run
//!
//! Stored as a small JSON object. Failures to read or write it never block
//! supervision: they are logged and the caller gets empty defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::supervisor::JobConfig;

const FILE_NAME: &str = "recent_paths.json";

/// Last job paths used. Empty strings mean "not set".
///
/// Older records written with `blender_path`/`blend_file`/`log_file` keys load too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPaths {
    #[serde(default, alias = "blender_path")]
    pub worker_path: String,
    #[serde(default, alias = "blend_file")]
    pub job_path: String,
    #[serde(default, alias = "log_file")]
    pub log_path: String,
}

impl RecentPaths {
    pub fn from_config(config: &JobConfig) -> Self {
        Self {
            worker_path: config.worker_path.display().to_string(),
            job_path: config.job_path.display().to_string(),
            log_path: config.log_path.display().to_string(),
        }
    }

    pub fn worker(&self) -> Option<PathBuf> {
        non_empty(&self.worker_path)
    }

    pub fn job(&self) -> Option<PathBuf> {
        non_empty(&self.job_path)
    }

    pub fn log(&self) -> Option<PathBuf> {
        non_empty(&self.log_path)
    }
}

fn non_empty(s: &str) -> Option<PathBuf> {
    let s = s.trim();
    (!s.is_empty()).then(|| PathBuf::from(s))
}

/// Location of the recent-paths record on disk
#[derive(Debug, Clone)]
pub struct RecentPathsStore {
    path: PathBuf,
}

impl RecentPathsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/relaunch/recent_paths.json`, or the current directory if there
    /// is no config directory.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("relaunch"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, falling back to empty defaults on any failure.
    pub fn load(&self) -> RecentPaths {
        match self.try_load() {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Error loading recent paths: {e}");
                RecentPaths::default()
            }
        }
    }

    /// Load the record. A missing file yields empty defaults.
    pub fn try_load(&self) -> Result<RecentPaths, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecentPaths::default()),
            Err(e) => return Err(PersistenceError::read(&self.path, e)),
        };

        serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, paths: &RecentPaths) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| PersistenceError::write(dir, e))?;
        }

        let json = serde_json::to_string_pretty(paths)
            .map_err(|e| PersistenceError::write(&self.path, std::io::Error::other(e)))?;
        fs::write(&self.path, json).map_err(|e| PersistenceError::write(&self.path, e))?;
        debug!(path = %self.path.display(), "Saved recent paths");
        Ok(())
    }

    /// Record the paths of a config that just started. Failures are only logged.
    pub fn remember(&self, config: &JobConfig) {
        if let Err(e) = self.save(&RecentPaths::from_config(config)) {
            warn!("Error saving recent paths: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let store = RecentPathsStore::new(temp.path().join(FILE_NAME));
        assert_eq!(store.load(), RecentPaths::default());
    }

    #[test]
    fn test_remember_then_load() {
        let temp = TempDir::new().unwrap();
        let store = RecentPathsStore::new(temp.path().join("nested").join(FILE_NAME));
        let config = JobConfig::new("/usr/bin/blender", "/jobs/a.blend", "/logs/render.txt");

        store.remember(&config);
        let loaded = store.load();

        assert_eq!(loaded.worker(), Some(PathBuf::from("/usr/bin/blender")));
        assert_eq!(loaded.job(), Some(PathBuf::from("/jobs/a.blend")));
        assert_eq!(loaded.log(), Some(PathBuf::from("/logs/render.txt")));
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);
        fs::write(
            &path,
            r#"{"blender_path": "C:/Blender/blender.exe", "blend_file": "", "log_file": "E:/render_log.txt"}"#,
        )
        .unwrap();

        let loaded = RecentPathsStore::new(&path).load();
        assert_eq!(loaded.worker_path, "C:/Blender/blender.exe");
        assert_eq!(loaded.job(), None);
        assert_eq!(loaded.log_path, "E:/render_log.txt");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);
        fs::write(&path, "{not json").unwrap();

        let store = RecentPathsStore::new(&path);
        assert!(matches!(store.try_load(), Err(PersistenceError::Parse { .. })));
        assert_eq!(store.load(), RecentPaths::default());
    }

    #[test]
    fn test_save_failure_does_not_panic() {
        let temp = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = RecentPathsStore::new(blocker.join(FILE_NAME));

        store.remember(&JobConfig::new("a", "b", "c"));
        assert!(store.save(&RecentPaths::default()).is_err());
    }
}
