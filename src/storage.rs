//! Storage layer for prio
//!
//! Everything lives under one data directory:
//!
//! ```text
//! <data dir>/
//!   .prio.toml                  # Optional configuration
//!   tasks.json                  # Pending task list (whole-state checkpoint)
//!   tasks.json.lock             # Writer lock
//!   completed_tasks/            # Daily archives
//!     archive.lock              # Writer lock shared by all days
//!     tasks_<YYYY-MM-DD>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::DailyArchive;
use crate::collection::{TaskList, TaskListSnapshot};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Resolve the data directory: an explicit path wins, then the platform
/// data directory, then the current directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    ProjectDirs::from("", "", "prio")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Storage manager for prio state
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    config: StorageConfig,
}

impl Storage {
    pub fn new(root: PathBuf, config: StorageConfig) -> Self {
        Self { root, config }
    }

    /// Storage with default file names
    pub fn for_dir(root: PathBuf) -> Self {
        Self::new(root, StorageConfig::default())
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Path to the pending task list
    pub fn task_file(&self) -> PathBuf {
        self.root.join(&self.config.task_file)
    }

    /// Path to the daily archive directory
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(&self.config.archive_dir)
    }

    /// The daily archive rooted in this storage
    pub fn archive(&self) -> DailyArchive {
        DailyArchive::new(self.archive_dir(), self.config.archive_prefix.clone())
    }

    /// Create the data directory if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }


    // =========================================================================
    // Task list checkpoints
    // =========================================================================

    /// Read the stored task list. `Ok(None)` when nothing is stored yet or
    /// the file is empty.
    pub fn try_load_tasks(&self) -> Result<Option<TaskList>> {
        let path = self.task_file();
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let snapshot: TaskListSnapshot = serde_json::from_str(&content)?;
        TaskList::from_snapshot(snapshot).map(Some)
    }

    /// Read the stored task list, starting empty when there is none or it
    /// cannot be read. A degraded load carries a warning for the user.
    pub fn load_tasks(&self) -> LoadedTasks {
        match self.try_load_tasks() {
            Ok(Some(tasks)) => {
                debug!(path = %self.task_file().display(), tasks = tasks.len(), "loaded tasks");
                LoadedTasks {
                    tasks,
                    warning: None,
                }
            }
            Ok(None) => LoadedTasks::default(),
            Err(err) => {
                warn!(
                    path = %self.task_file().display(),
                    error = %err,
                    "unreadable task state, starting with an empty list"
                );
                LoadedTasks {
                    tasks: TaskList::new(),
                    warning: Some(format!(
                        "{} is unreadable ({err}); starting with an empty list",
                        self.task_file().display()
                    )),
                }
            }
        }
    }

    /// Take the writer lock on the task file. Hold it from load to save so
    /// overlapping runs cannot lose each other's changes.
    pub fn lock_tasks(&self) -> Result<FileLock> {
        FileLock::acquire(lock::lock_path_for(&self.task_file()), DEFAULT_LOCK_TIMEOUT_MS)
    }

    /// Overwrite the stored task list. `lock` must come from
    /// [`lock_tasks`](Self::lock_tasks) on this storage.
    pub fn save_tasks(&self, tasks: &TaskList, lock: &FileLock) -> Result<()> {
        let path = self.task_file();
        if lock.path() != lock::lock_path_for(&path) {
            return Err(Error::InvalidArgument(format!(
                "{} does not guard {}",
                lock.path().display(),
                path.display()
            )));
        }
        self.write_json(&path, &tasks.to_snapshot())?;
        debug!(path = %path.display(), tasks = tasks.len(), "saved tasks");
        Ok(())
    }
}

/// Result of [`Storage::load_tasks`]
#[derive(Debug, Default)]
pub struct LoadedTasks {
    pub tasks: TaskList,
    /// Why the list had to start empty, if it did
    pub warning: Option<String>,
}
