//! Error types for prio
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, malformed chain notation, bad config)
//! - 3: Structural error (empty list, unknown task, group misuse)
//! - 4: Operation failed (I/O, serialization, locking)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::{GroupId, TaskId};

/// Exit codes for the prio CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const STRUCTURAL: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for prio operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid chain notation: {0}")]
    ChainParse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Structural errors (exit code 3)
    #[error("Task list is empty")]
    EmptyCollection,

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Task {task} already belongs to group {group}")]
    DuplicateGroupAssignment { task: TaskId, group: GroupId },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {}", .0.display())]
    LockFailed(PathBuf),

    #[error("Corrupt task state: {0}")]
    CorruptState(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ChainParse(_) | Error::InvalidArgument(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::EmptyCollection
            | Error::NotFound(_)
            | Error::GroupNotFound(_)
            | Error::DuplicateGroupAssignment { .. } => exit_codes::STRUCTURAL,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::CorruptState(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Stable machine-readable name for JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ChainParse(_) => "chain_parse",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidConfig(_) => "invalid_config",
            Error::EmptyCollection => "empty_collection",
            Error::NotFound(_) => "not_found",
            Error::GroupNotFound(_) => "group_not_found",
            Error::DuplicateGroupAssignment { .. } => "duplicate_group_assignment",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::TomlParse(_) => "toml",
            Error::LockFailed(_) => "lock_failed",
            Error::CorruptState(_) => "corrupt_state",
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(task) => Some(serde_json::json!({ "task": task })),
            Error::GroupNotFound(group) => Some(serde_json::json!({ "group": group })),
            Error::DuplicateGroupAssignment { task, group } => {
                Some(serde_json::json!({ "task": task, "group": group }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for prio operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_categories() {
        assert_eq!(Error::ChainParse("x".into()).exit_code(), exit_codes::USER_ERROR);
        assert_eq!(Error::EmptyCollection.exit_code(), exit_codes::STRUCTURAL);
        assert_eq!(Error::NotFound(TaskId(4)).exit_code(), exit_codes::STRUCTURAL);
        assert_eq!(
            Error::LockFailed(PathBuf::from("x.lock")).exit_code(),
            exit_codes::OPERATION_FAILED
        );
    }

    #[test]
    fn details_carry_handles() {
        let err = Error::DuplicateGroupAssignment {
            task: TaskId(3),
            group: GroupId(1),
        };
        let details = err.details().expect("details");
        assert_eq!(details["task"], 3);
        assert_eq!(details["group"], 1);
        assert_eq!(err.kind(), "duplicate_group_assignment");
        assert!(Error::EmptyCollection.details().is_none());
    }
}
