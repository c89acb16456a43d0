//! Task data model.
//!
//! `Task` and `TaskGroup` are plain data holders; all ordering decisions live
//! in [`crate::collection::TaskList`]. A finished task is consumed into an
//! [`ArchiveRecord`], which carries the completion stamp and the resolved
//! group name.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Handle of a pending task, assigned by the task list on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a task group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub(crate) id: TaskId,
    pub label: String,
    pub(crate) priority: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) group: Option<GroupId>,
    pub(crate) seq: u64,
}

impl Task {
    /// Create a pending task. The id and insertion sequence are assigned
    /// when the task is inserted into a [`crate::collection::TaskList`].
    pub fn new(label: impl Into<String>, priority: i64) -> Self {
        Self {
            id: TaskId(0),
            label: label.into(),
            priority,
            comment: String::new(),
            group: None,
            seq: 0,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Consume the task into its archive form.
    pub fn into_record(self, done_date: DateTime<Local>, group_name: Option<String>) -> ArchiveRecord {
        ArchiveRecord {
            label: self.label,
            priority: self.priority,
            comment: self.comment,
            done_date,
            group: group_name,
        }
    }
}

/// A named (possibly anonymous) set of tasks whose priorities move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub(crate) id: GroupId,
    pub name: String,
    #[serde(default)]
    pub(crate) members: Vec<TaskId>,
}

impl TaskGroup {
    pub(crate) fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Members in the order they joined the group. Finished members stay
    /// listed; the task list skips them when propagating priority changes.
    pub fn members(&self) -> &[TaskId] {
        &self.members
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// Immutable record of a finished task, as written to the daily archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub label: String,
    pub priority: i64,
    #[serde(default)]
    pub comment: String,
    pub done_date: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A single-field change requested through [`crate::collection::TaskList::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// New absolute priority; propagates to the task's group as a delta.
    Priority(i64),
    Label(String),
    Comment(String),
}
