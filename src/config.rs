use crate::navigator::{NavigatorOptions, DEFAULT_UPCOMING_DAYS};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where bucket files live. Falls back to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,

    #[serde(default = "default_notice_timeout_secs")]
    pub notice_timeout_secs: u64,
}

fn default_upcoming_days() -> u32 {
    DEFAULT_UPCOMING_DAYS
}

fn default_notice_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            upcoming_days: default_upcoming_days(),
            notice_timeout_secs: default_notice_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads `path`, or the platform config file when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("reading config {}", config_path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", config_path.display()))?;
        Ok(config)
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("todos")),
        }
    }

    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            upcoming_days: self.upcoming_days,
            notice_timeout: Duration::from_secs(self.notice_timeout_secs),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "dayboard").context("locating home directory")
}

pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("logs"))
}
