//! Optional TOML settings file for the `relaunch` CLI
//!
//! ```toml
//! liveness_interval_secs = 10
//! tail_interval_secs = 2
//! process_name = "blender"
//! recent_paths_file = "/home/me/.relaunch-recent.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::supervisor::SupervisorSettings;

#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub liveness_interval_secs: Option<u64>,
    pub tail_interval_secs: Option<u64>,
    pub process_name: Option<String>,
    pub recent_paths_file: Option<PathBuf>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let settings: SettingsFile = toml::from_str(content).context("Failed to parse TOML")?;
        if settings.liveness_interval_secs == Some(0) {
            bail!("liveness_interval_secs must be at least 1");
        }
        if settings.tail_interval_secs == Some(0) {
            bail!("tail_interval_secs must be at least 1");
        }
        Ok(settings)
    }

    /// Supervisor settings with unset fields left at their defaults.
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        let defaults = SupervisorSettings::default();
        SupervisorSettings {
            liveness_interval: self
                .liveness_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.liveness_interval),
            tail_interval: self
                .tail_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.tail_interval),
            process_name: self.process_name.clone(),
        }
    }
}
