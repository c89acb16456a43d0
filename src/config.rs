//! Configuration loading and management
//!
//! Handles parsing of the optional `.prio.toml` file in the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::archive::{DEFAULT_ARCHIVE_DIR, DEFAULT_ARCHIVE_PREFIX};
use crate::chain::DEFAULT_CHAIN_MARKER;
use crate::error::{Error, Result};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = ".prio.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chain notation settings
    #[serde(default)]
    pub chain: ChainConfig,

    /// Human output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where task state and archives live, relative to the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Pending task list
    #[serde(default = "default_task_file")]
    pub task_file: String,

    /// Directory of daily archive files
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// File name prefix of daily archive files
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
}

fn default_task_file() -> String {
    "tasks.json".to_string()
}

fn default_archive_dir() -> String {
    DEFAULT_ARCHIVE_DIR.to_string()
}

fn default_archive_prefix() -> String {
    DEFAULT_ARCHIVE_PREFIX.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            task_file: default_task_file(),
            archive_dir: default_archive_dir(),
            archive_prefix: default_archive_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Separator between chained labels
    #[serde(default = "default_chain_marker")]
    pub marker: String,
}

fn default_chain_marker() -> String {
    DEFAULT_CHAIN_MARKER.to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            marker: default_chain_marker(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show task ids in human output
    #[serde(default = "default_true")]
    pub show_ids: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_ids: true }
    }
}

impl Config {
    /// Load configuration from a `.prio.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.chain.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        validate_file_name(&self.task_file, "storage.task_file")?;
        if self.archive_dir.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "storage.archive_dir cannot be empty".to_string(),
            ));
        }
        if self.archive_prefix.contains(&['/', '\\'][..]) {
            return Err(Error::InvalidConfig(
                "storage.archive_prefix cannot contain path separators".to_string(),
            ));
        }
        Ok(())
    }
}

impl ChainConfig {
    fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(Error::InvalidConfig("chain.marker cannot be empty".to_string()));
        }
        if self.marker.contains(':') {
            return Err(Error::InvalidConfig(
                "chain.marker cannot contain ':'".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_file_name(value: &str, field: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    if trimmed.contains(&['/', '\\'][..]) {
        return Err(Error::InvalidConfig(format!(
            "{field} must be a file name, got '{trimmed}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.task_file, "tasks.json");
        assert_eq!(cfg.storage.archive_dir, "completed_tasks");
        assert_eq!(cfg.storage.archive_prefix, "tasks_");
        assert_eq!(cfg.chain.marker, "->");
        assert!(cfg.display.show_ids);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[storage]
task_file = "todo.json"
archive_prefix = "done_"

[chain]
marker = "=>"

[display]
show_ids = false
"#,
        )
        .expect("write config");

        let cfg = Config::load(&path).expect("load");
        assert_eq!(cfg.storage.task_file, "todo.json");
        assert_eq!(cfg.storage.archive_dir, "completed_tasks");
        assert_eq!(cfg.storage.archive_prefix, "done_");
        assert_eq!(cfg.chain.marker, "=>");
        assert!(!cfg.display.show_ids);
    }

    #[test]
    fn invalid_marker_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[chain]\nmarker = \":\"\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid marker");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn task_file_must_be_a_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\ntask_file = \"../tasks.json\"\n").expect("write config");

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_from_dir_falls_back_on_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), "this = [not valid").expect("write config");

        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.storage.task_file, "tasks.json");
    }
}
