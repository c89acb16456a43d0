//! prio - priority-ordered personal task list
//!
//! This library provides the core of the `prio` CLI tool.
//!
//! # Core Concepts
//!
//! - **Task list**: pending tasks kept sorted by priority; the head is always
//!   the most urgent task, ties go to the earliest insertion
//! - **Groups**: tasks created together whose priorities move together
//! - **Chains**: `[group:]priority:label[->label...]` creates a group of
//!   tasks with descending priorities in one go
//! - **Archive**: finished tasks are appended to one JSON file per day
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `collection`: The ordered task list and its mutations
//! - `task`: Task, group, and archive record types
//! - `chain`: Chain notation parser
//! - `archive`: Archive sinks (daily files, in-memory)
//! - `storage`: Task list persistence and data directory layout
//! - `config`: Configuration loading from `.prio.toml`
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON command output
//! - `error`: Error types and result aliases

pub mod archive;
pub mod chain;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod storage;
pub mod task;

pub use collection::TaskList;
pub use error::{Error, Result};
pub use task::{ArchiveRecord, Edit, GroupId, Task, TaskGroup, TaskId};
