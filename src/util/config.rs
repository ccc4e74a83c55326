//! Configuration file support for outpost.
//!
//! Two locations are read:
//! - Global: `~/.outpost/config.toml` - User-wide defaults
//! - Project: `.outpost/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Number of log lines `service logs` shows when nothing else is set.
pub const DEFAULT_LOG_LINES: usize = 100;

/// outpost configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command execution settings
    pub exec: ExecConfig,

    /// Service operation settings
    pub services: ServiceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Deadline for a whole CLI invocation, in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Lines returned by `service logs` when `--lines` is not given
    pub log_lines: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("ignoring config at {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.exec.timeout_secs.is_some() {
            self.exec.timeout_secs = other.exec.timeout_secs;
        }
        if other.services.log_lines.is_some() {
            self.services.log_lines = other.services.log_lines;
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.exec.timeout_secs.map(Duration::from_secs)
    }

    pub fn log_lines(&self) -> usize {
        self.services.log_lines.unwrap_or(DEFAULT_LOG_LINES)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.outpost/config.toml)
/// 2. Global config (~/.outpost/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Directory holding the global config (`~/.outpost`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".outpost"))
}

pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|d| d.join("config.toml"))
}

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".outpost").join("config.toml")
}
