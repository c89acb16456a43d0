//! The ordered task list.
//!
//! `TaskList` keeps every pending task in a `Vec` sorted by
//! `(priority desc, seq asc)`, where `seq` is the insertion sequence number.
//! The first element is always the head. Tasks and groups are addressed by
//! handles ([`TaskId`], [`GroupId`]) instead of references, so a finished
//! task can never be reached through a stale link.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archive::ArchiveSink;
use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::task::{Edit, GroupId, Task, TaskGroup, TaskId};

/// Schema tag written into persisted task lists
pub const TASKS_SCHEMA_VERSION: &str = "prio.tasks.v1";

fn order_key(task: &Task) -> (Reverse<i64>, u64) {
    (Reverse(task.priority), task.seq)
}

/// Priority-ordered collection of pending tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    groups: BTreeMap<GroupId, TaskGroup>,
    next_task_id: u64,
    next_group_id: u64,
    next_seq: u64,
}

pub type Iter<'a> = std::slice::Iter<'a, Task>;

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The pending task with the highest priority.
    ///
    /// `None` means the list needs input: the caller should ask the user for
    /// a new task and [`insert`](Self::insert) it.
    pub fn head(&self) -> Option<&Task> {
        self.tasks.first()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Pending tasks in current priority order.
    pub fn iter(&self) -> Iter<'_> {
        self.tasks.iter()
    }

    /// Same as [`iter`](Self::iter); each call starts from the current head.
    pub fn list_all(&self) -> Iter<'_> {
        self.iter()
    }

    pub fn group(&self, id: GroupId) -> Option<&TaskGroup> {
        self.groups.get(&id)
    }

    /// The group a pending task belongs to, if any.
    pub fn group_of(&self, id: TaskId) -> Option<&TaskGroup> {
        self.get(id)
            .and_then(|task| task.group)
            .and_then(|group| self.groups.get(&group))
    }

    pub fn groups(&self) -> impl Iterator<Item = &TaskGroup> {
        self.groups.values()
    }

    /// Insert a task at the position given by its priority. Among equal
    /// priorities the new task goes last.
    pub fn insert(&mut self, mut task: Task) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        task.id = id;
        task.seq = self.next_seq;
        self.next_seq += 1;
        task.group = None;

        let key = order_key(&task);
        let pos = self.tasks.partition_point(|existing| order_key(existing) < key);
        debug!(task = %id, priority = task.priority, pos, "insert task");
        self.tasks.insert(pos, task);
        id
    }

    /// Remove a pending task; the remaining tasks keep their order.
    ///
    /// The task leaves its group, and the group is dropped once it has no
    /// pending members.
    pub fn remove(&mut self, id: TaskId) -> Result<Task> {
        let pos = self.position(id).ok_or(Error::NotFound(id))?;
        debug!(task = %id, pos, "remove task");
        let mut task = self.tasks.remove(pos);
        if let Some(group) = task.group.take() {
            if let Some(entry) = self.groups.get_mut(&group) {
                entry.members.retain(|member| *member != id);
            }
            self.prune_group(group);
        }
        Ok(task)
    }

    /// Finish the head: stamp it with `now`, hand its record to `sink`, and
    /// drop it from the list. Returns the new head.
    ///
    /// If the sink fails the list is left unchanged.
    pub fn complete_head<S>(&mut self, sink: &mut S, now: DateTime<Local>) -> Result<Option<&Task>>
    where
        S: ArchiveSink + ?Sized,
    {
        let head = self.tasks.first().ok_or(Error::EmptyCollection)?;
        let id = head.id;
        let group = head.group;
        let group_name = group
            .and_then(|group| self.groups.get(&group))
            .map(|group| group.name.clone());

        let record = head.clone().into_record(now, group_name);
        sink.append(&record, now.date_naive())?;

        self.tasks.remove(0);
        if let Some(group) = group {
            self.prune_group(group);
        }
        debug!(task = %id, remaining = self.tasks.len(), "completed head");
        Ok(self.tasks.first())
    }

    /// Set a task's priority. For a grouped task the same delta is applied to
    /// every pending member of its group, then the order is rebuilt once.
    pub fn change_priority(&mut self, id: TaskId, new_priority: i64) -> Result<()> {
        let task = self.get(id).ok_or(Error::NotFound(id))?;
        let delta = new_priority
            .checked_sub(task.priority)
            .ok_or_else(|| Error::InvalidArgument(format!("priority {new_priority} out of range")))?;
        if delta == 0 {
            return Ok(());
        }

        let affected: HashSet<TaskId> = match task.group.and_then(|group| self.groups.get(&group)) {
            Some(group) => group.members.iter().copied().collect(),
            None => HashSet::from([id]),
        };

        // Compute everything first so an overflow leaves no partial update.
        let mut updates = Vec::with_capacity(affected.len());
        for (pos, task) in self.tasks.iter().enumerate() {
            if !affected.contains(&task.id) {
                continue;
            }
            let priority = task.priority.checked_add(delta).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "priority change of {delta} overflows task {}",
                    task.id
                ))
            })?;
            updates.push((pos, priority));
        }

        for (pos, priority) in updates {
            self.tasks[pos].priority = priority;
        }
        self.tasks.sort_by_key(order_key);
        debug!(task = %id, delta, affected = affected.len(), "priority changed");
        Ok(())
    }

    /// Apply a single-field edit. Only priority edits reorder or propagate.
    pub fn edit(&mut self, id: TaskId, edit: Edit) -> Result<()> {
        match edit {
            Edit::Priority(priority) => self.change_priority(id, priority),
            Edit::Label(label) => {
                self.task_mut(id)?.label = label;
                Ok(())
            }
            Edit::Comment(comment) => {
                self.task_mut(id)?.comment = comment;
                Ok(())
            }
        }
    }

    /// Create an empty group. An empty name makes it anonymous.
    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(id, TaskGroup::new(id, name));
        id
    }

    /// Add a pending task to a group. A task joins at most one group.
    pub fn assign_group(&mut self, task: TaskId, group: GroupId) -> Result<()> {
        if !self.groups.contains_key(&group) {
            return Err(Error::GroupNotFound(group));
        }
        let pos = self.position(task).ok_or(Error::NotFound(task))?;
        if let Some(existing) = self.tasks[pos].group {
            return Err(Error::DuplicateGroupAssignment {
                task,
                group: existing,
            });
        }

        self.tasks[pos].group = Some(group);
        if let Some(entry) = self.groups.get_mut(&group) {
            entry.members.push(task);
        }
        Ok(())
    }

    /// Insert every task of a parsed chain, grouping them when the chain
    /// calls for it. Returns the new ids in chain order.
    pub fn add_chain(&mut self, chain: &Chain) -> Vec<TaskId> {
        let group = chain
            .forms_group()
            .then(|| self.create_group(chain.group.clone().unwrap_or_default()));

        let mut ids = Vec::with_capacity(chain.labels.len());
        for (label, priority) in chain.tasks() {
            let id = self.insert(Task::new(label, priority));
            if let Some(group) = group {
                self.attach(id, group);
            }
            ids.push(id);
        }
        debug!(tasks = ids.len(), grouped = group.is_some(), "added chain");
        ids
    }

    /// Serializable form of the whole list.
    pub fn to_snapshot(&self) -> TaskListSnapshot {
        TaskListSnapshot {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            next_task_id: self.next_task_id,
            next_group_id: self.next_group_id,
            next_seq: self.next_seq,
            tasks: self.tasks.clone(),
            groups: self.groups.values().cloned().collect(),
        }
    }

    /// Rebuild a list from a snapshot, checking handles and group
    /// back-references and restoring the order.
    pub fn from_snapshot(snapshot: TaskListSnapshot) -> Result<Self> {
        if snapshot.schema_version != TASKS_SCHEMA_VERSION {
            return Err(Error::CorruptState(format!(
                "unsupported schema version '{}'",
                snapshot.schema_version
            )));
        }

        let mut groups = BTreeMap::new();
        for group in snapshot.groups {
            if group.id.0 >= snapshot.next_group_id {
                return Err(Error::CorruptState(format!(
                    "group {} beyond id counter",
                    group.id
                )));
            }
            let id = group.id;
            if groups.insert(id, group).is_some() {
                return Err(Error::CorruptState(format!("duplicate group {id}")));
            }
        }

        let mut seen = HashSet::new();
        let mut seqs = HashSet::new();
        for task in &snapshot.tasks {
            if task.id.0 >= snapshot.next_task_id || task.seq >= snapshot.next_seq {
                return Err(Error::CorruptState(format!(
                    "task {} beyond id or sequence counter",
                    task.id
                )));
            }
            if !seen.insert(task.id) || !seqs.insert(task.seq) {
                return Err(Error::CorruptState(format!("duplicate task {}", task.id)));
            }
            if let Some(group) = task.group {
                let member = groups
                    .get(&group)
                    .is_some_and(|entry: &TaskGroup| entry.members.contains(&task.id));
                if !member {
                    return Err(Error::CorruptState(format!(
                        "task {} not listed in group {group}",
                        task.id
                    )));
                }
            }
        }

        let pending_group: BTreeMap<TaskId, Option<GroupId>> = snapshot
            .tasks
            .iter()
            .map(|task| (task.id, task.group))
            .collect();
        for group in groups.values() {
            for member in &group.members {
                if let Some(actual) = pending_group.get(member) {
                    if *actual != Some(group.id) {
                        return Err(Error::CorruptState(format!(
                            "group {} lists task {member} owned elsewhere",
                            group.id
                        )));
                    }
                }
            }
        }

        let mut tasks = snapshot.tasks;
        tasks.sort_by_key(order_key);

        Ok(Self {
            tasks,
            groups,
            next_task_id: snapshot.next_task_id,
            next_group_id: snapshot.next_group_id,
            next_seq: snapshot.next_seq,
        })
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::NotFound(id))
    }

    // Both handles were just created by the caller, so neither lookup fails.
    fn attach(&mut self, task: TaskId, group: GroupId) {
        if let Some(pos) = self.position(task) {
            self.tasks[pos].group = Some(group);
        }
        if let Some(entry) = self.groups.get_mut(&group) {
            entry.members.push(task);
        }
    }

    /// Forget a group once none of its members are pending.
    fn prune_group(&mut self, group: GroupId) {
        let live = self.tasks.iter().any(|task| task.group == Some(group));
        if !live {
            self.groups.remove(&group);
            debug!(group = %group, "group finished");
        }
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Persisted form of a [`TaskList`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListSnapshot {
    pub schema_version: String,
    pub saved_at: DateTime<Utc>,
    pub next_task_id: u64,
    pub next_group_id: u64,
    pub next_seq: u64,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub groups: Vec<TaskGroup>,
}
