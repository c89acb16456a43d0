#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{Local, NaiveDate};
use prio::archive::DailyArchive;
use prio::storage::Storage;
use prio::task::ArchiveRecord;
use tempfile::TempDir;

/// Temporary prio data directory
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> Storage {
        Storage::for_dir(self.dir.path().to_path_buf())
    }

    pub fn archive(&self) -> DailyArchive {
        self.storage().archive()
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".prio.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn archived_today(&self) -> Vec<ArchiveRecord> {
        self.archive()
            .read_day(self.today())
            .expect("read archive")
    }

    /// `prio` command pointed at this directory
    pub fn prio(&self) -> Command {
        let mut cmd = prio_cmd();
        cmd.arg("--dir").arg(self.dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

pub fn prio_cmd() -> Command {
    Command::cargo_bin("prio").expect("prio binary")
}
