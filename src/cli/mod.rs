//! Command-line interface for prio
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in `task`, archive browsing in `archive`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::collection::TaskList;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::{resolve_data_dir, Storage};
use crate::task::Task;

mod archive;
mod task;

/// prio - a priority-ordered task list
///
/// Keeps pending tasks sorted by priority, always shows the most urgent one
/// first, and archives finished tasks into one record file per day.
#[derive(Parser, Debug)]
#[command(name = "prio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding tasks and archives
    #[arg(long, global = true, env = "PRIO_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the most urgent task
    Show,

    /// Add a task
    New {
        /// Task label
        label: String,

        /// Priority (higher is more urgent)
        #[arg(short, long, allow_hyphen_values = true)]
        priority: i64,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Finish the most urgent task and archive it
    Finish,

    /// Edit a task (defaults to the most urgent one)
    Edit {
        /// Task id (see `prio list`)
        #[arg(long)]
        id: Option<u64>,

        /// New priority; grouped tasks move together
        #[arg(short, long, allow_hyphen_values = true)]
        priority: Option<i64>,

        /// New label
        #[arg(short, long)]
        label: Option<String>,

        /// New comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List pending tasks in priority order
    List,

    /// Add a chain of tasks: [group:]priority:label[->label...]
    Chain {
        /// Chain notation, e.g. "Laundry:3:Wash->Dry->Fold"
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Show finished tasks of a day
    Archive {
        /// Day to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        day: Option<NaiveDate>,

        /// List the days that have archives instead
        #[arg(long, conflicts_with = "day")]
        days: bool,
    },
}

/// Loaded data directory: configuration plus storage
pub(crate) struct Workspace {
    pub storage: Storage,
    pub config: Config,
}

impl Workspace {
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let root = resolve_data_dir(dir);
        let config = Config::load_from_dir(&root);
        let storage = Storage::new(root, config.storage.clone());
        storage.init()?;
        Ok(Self { storage, config })
    }
}

/// Task as shown in command output
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TaskView {
    pub id: u64,
    pub label: String,
    pub priority: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl TaskView {
    pub fn of(task: &Task, list: &TaskList) -> Self {
        Self {
            id: task.id().0,
            label: task.label.clone(),
            priority: task.priority(),
            comment: task.comment.clone(),
            group: list.group_of(task.id()).map(|group| group.name.clone()),
        }
    }

    /// One-line rendering, e.g. `[3] #4 Wash (group: Laundry)`
    pub fn line(&self, show_ids: bool) -> String {
        let mut line = format!("[{}]", self.priority);
        if show_ids {
            line.push_str(&format!(" #{}", self.id));
        }
        line.push(' ');
        line.push_str(&self.label);
        match self.group.as_deref() {
            Some("") => line.push_str(" (grouped)"),
            Some(name) => line.push_str(&format!(" (group: {name})")),
            None => {}
        }
        line
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Show => task::run_show(task::ShowOptions {
                dir: self.dir,
                output,
            }),
            Commands::New {
                label,
                priority,
                comment,
            } => task::run_new(task::NewOptions {
                label,
                priority,
                comment,
                dir: self.dir,
                output,
            }),
            Commands::Finish => task::run_finish(task::FinishOptions {
                dir: self.dir,
                output,
            }),
            Commands::Edit {
                id,
                priority,
                label,
                comment,
            } => task::run_edit(task::EditOptions {
                id,
                priority,
                label,
                comment,
                dir: self.dir,
                output,
            }),
            Commands::List => task::run_list(task::ListOptions {
                dir: self.dir,
                output,
            }),
            Commands::Chain { text } => task::run_chain(task::ChainOptions {
                text,
                dir: self.dir,
                output,
            }),
            Commands::Archive { day, days } => archive::run(archive::ArchiveOptions {
                day,
                days,
                dir: self.dir,
                output,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_negative_priority() {
        let cli = Cli::try_parse_from(["prio", "new", "Someday", "--priority", "-3"]).expect("parse");
        match cli.command {
            Commands::New { label, priority, .. } => {
                assert_eq!(label, "Someday");
                assert_eq!(priority, -3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_parses_archive_day() {
        let cli = Cli::try_parse_from(["prio", "archive", "--day", "2024-05-01"]).expect("parse");
        match cli.command {
            Commands::Archive { day, days } => {
                assert_eq!(day, NaiveDate::from_ymd_opt(2024, 5, 1));
                assert!(!days);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn task_view_line_marks_groups() {
        let view = TaskView {
            id: 4,
            label: "Wash".to_string(),
            priority: 3,
            comment: String::new(),
            group: Some("Laundry".to_string()),
        };
        assert_eq!(view.line(true), "[3] #4 Wash (group: Laundry)");
        assert_eq!(view.line(false), "[3] Wash (group: Laundry)");

        let anonymous = TaskView {
            group: Some(String::new()),
            ..view
        };
        assert_eq!(anonymous.line(false), "[3] Wash (grouped)");
    }
}
