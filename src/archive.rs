//! Archive of finished tasks.
//!
//! Finished tasks are appended to one JSON file per calendar day:
//!
//! ```text
//! completed_tasks/
//!   tasks_2024-05-01.json     # [ {label, priority, comment, done_date, group?}, ... ]
//!   tasks_2024-05-02.json
//! ```
//!
//! Appending reads the day's array, pushes the record, and rewrites the file
//! atomically while holding `archive.lock` in the same directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::ArchiveRecord;

/// Default directory for daily archives
pub const DEFAULT_ARCHIVE_DIR: &str = "completed_tasks";

/// Default file name prefix for daily archives
pub const DEFAULT_ARCHIVE_PREFIX: &str = "tasks_";

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Single writer lock for every day file in the archive directory
const ARCHIVE_LOCK_FILE: &str = "archive.lock";

/// Receives finished tasks.
pub trait ArchiveSink {
    /// Append one record to the archive of `day`.
    fn append(&mut self, record: &ArchiveRecord, day: NaiveDate) -> Result<()>;
}

/// File-backed archive with one JSON array per day.
#[derive(Debug, Clone)]
pub struct DailyArchive {
    dir: PathBuf,
    prefix: String,
}

impl DailyArchive {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the archive file for `day`
    pub fn day_file(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", self.prefix, day.format(DAY_FORMAT)))
    }

    /// Records finished on `day`, in completion order. A missing or empty
    /// file yields no records.
    pub fn read_day(&self, day: NaiveDate) -> Result<Vec<ArchiveRecord>> {
        read_records(&self.day_file(day))
    }

    /// Days that have an archive file, oldest first.
    pub fn days(&self) -> Result<Vec<NaiveDate>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut days = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let day = name
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|stamp| NaiveDate::parse_from_str(stamp, DAY_FORMAT).ok());
            if let Some(day) = day {
                days.push(day);
            }
        }
        days.sort();
        Ok(days)
    }
}

impl ArchiveSink for DailyArchive {
    fn append(&mut self, record: &ArchiveRecord, day: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let _lock = FileLock::acquire(self.dir.join(ARCHIVE_LOCK_FILE), DEFAULT_LOCK_TIMEOUT_MS)?;
        let path = self.day_file(day);

        let mut records = read_records(&path)?;
        records.push(record.clone());

        let json = serde_json::to_string_pretty(&records)?;
        lock::write_atomic(&path, json.as_bytes())?;
        debug!(path = %path.display(), records = records.len(), "archived task");
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<ArchiveRecord>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// In-memory archive, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(NaiveDate, ArchiveRecord)>,
}

impl MemoryArchive {
    /// Every appended record with its day, in append order.
    pub fn records(&self) -> &[(NaiveDate, ArchiveRecord)] {
        &self.entries
    }

    pub fn day(&self, day: NaiveDate) -> Vec<&ArchiveRecord> {
        self.entries
            .iter()
            .filter(|(entry_day, _)| *entry_day == day)
            .map(|(_, record)| record)
            .collect()
    }
}

impl ArchiveSink for MemoryArchive {
    fn append(&mut self, record: &ArchiveRecord, day: NaiveDate) -> Result<()> {
        self.entries.push((day, record.clone()));
        Ok(())
    }
}
