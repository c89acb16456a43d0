//! prio task commands: show, new, finish, edit, list, chain.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use super::{TaskView, Workspace};
use crate::archive::ArchiveSink;
use crate::chain::Chain;
use crate::collection::TaskList;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::LoadedTasks;
use crate::task::{ArchiveRecord, Edit, Task, TaskId};

pub struct ShowOptions {
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct NewOptions {
    pub label: String,
    pub priority: i64,
    pub comment: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct FinishOptions {
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct EditOptions {
    pub id: Option<u64>,
    pub priority: Option<i64>,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct ListOptions {
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct ChainOptions {
    pub text: String,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct ShowReport {
    head: Option<TaskView>,
    pending: usize,
}

#[derive(Serialize)]
struct NewReport {
    task: TaskView,
    head: Option<TaskView>,
}

#[derive(Serialize)]
struct FinishReport {
    finished: ArchiveRecord,
    archive_file: PathBuf,
    head: Option<TaskView>,
}

#[derive(Serialize)]
struct EditReport {
    task: TaskView,
    /// Pending tasks whose priority moved
    moved: Vec<u64>,
}

#[derive(Serialize)]
struct ListReport {
    tasks: Vec<TaskView>,
}

#[derive(Serialize)]
struct ChainReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    tasks: Vec<TaskView>,
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let LoadedTasks { tasks: list, warning } = ws.storage.load_tasks();
    let show_ids = ws.config.display.show_ids;

    let head = list.head().map(|task| TaskView::of(task, &list));
    let report = ShowReport {
        head: head.clone(),
        pending: list.len(),
    };

    let mut human = match &head {
        Some(view) => {
            let mut human = HumanOutput::new(format!("prio: {}", view.label));
            push_task_summary(&mut human, view, show_ids);
            human.push_summary("pending", list.len().to_string());
            human.push_next_step("prio finish");
            human
        }
        None => {
            let mut human = HumanOutput::new("prio: nothing to do");
            human.push_next_step("prio new <label> --priority <n>");
            human
        }
    };
    push_load_warning(&mut human, warning);

    emit_success(options.output, "show", &report, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let label = options.label.trim().to_string();
    if label.is_empty() {
        return Err(Error::InvalidArgument("label cannot be empty".to_string()));
    }

    let lock = ws.storage.lock_tasks()?;
    let LoadedTasks {
        tasks: mut list,
        warning,
    } = ws.storage.load_tasks();

    let mut task = Task::new(label, options.priority);
    if let Some(comment) = options.comment {
        task = task.with_comment(comment);
    }
    let id = list.insert(task);
    ws.storage.save_tasks(&list, &lock)?;
    drop(lock);

    let view = lookup(&list, id)?;
    let report = NewReport {
        task: view.clone(),
        head: list.head().map(|task| TaskView::of(task, &list)),
    };

    let mut human = HumanOutput::new(format!("prio new: {}", view.label));
    push_task_summary(&mut human, &view, ws.config.display.show_ids);
    if list.head().map(Task::id) == Some(id) {
        human.push_detail("now the most urgent task");
    }
    push_load_warning(&mut human, warning);

    emit_success(options.output, "new", &report, Some(&human))
}

pub fn run_finish(options: FinishOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let lock = ws.storage.lock_tasks()?;
    let LoadedTasks {
        tasks: mut list,
        warning,
    } = ws.storage.load_tasks();

    let now = Local::now();
    let mut archive = ws.storage.archive();
    let mut sink = Recording {
        inner: &mut archive,
        last: None,
    };
    list.complete_head(&mut sink, now)?;
    let finished = sink.last.take().ok_or(Error::EmptyCollection)?;
    ws.storage.save_tasks(&list, &lock)?;
    drop(lock);

    let archive_file = archive.day_file(now.date_naive());
    let head = list.head().map(|task| TaskView::of(task, &list));
    let show_ids = ws.config.display.show_ids;

    let mut human = HumanOutput::new(format!("prio finish: {}", finished.label));
    human.push_summary("archive", archive_file.display().to_string());
    match &head {
        Some(view) => human.push_summary("next", view.line(show_ids)),
        None => human.push_next_step("prio new <label> --priority <n>"),
    }
    push_load_warning(&mut human, warning);

    let report = FinishReport {
        finished,
        archive_file,
        head,
    };
    emit_success(options.output, "finish", &report, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;

    let mut edits = Vec::new();
    if let Some(label) = options.label {
        let label = label.trim().to_string();
        if label.is_empty() {
            return Err(Error::InvalidArgument("label cannot be empty".to_string()));
        }
        edits.push(Edit::Label(label));
    }
    if let Some(comment) = options.comment {
        edits.push(Edit::Comment(comment));
    }
    if let Some(priority) = options.priority {
        edits.push(Edit::Priority(priority));
    }
    if edits.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit; pass --priority, --label or --comment".to_string(),
        ));
    }

    let lock = ws.storage.lock_tasks()?;
    let LoadedTasks {
        tasks: mut list,
        warning,
    } = ws.storage.load_tasks();

    let id = match options.id {
        Some(id) => TaskId(id),
        None => list.head().map(Task::id).ok_or(Error::EmptyCollection)?,
    };

    let before: Vec<(TaskId, i64)> = list.iter().map(|task| (task.id(), task.priority())).collect();
    for edit in edits {
        list.edit(id, edit)?;
    }
    ws.storage.save_tasks(&list, &lock)?;
    drop(lock);

    let moved = before
        .iter()
        .filter(|(task, priority)| list.get(*task).map(Task::priority) != Some(*priority))
        .map(|(task, _)| task.0)
        .collect::<Vec<_>>();

    let view = lookup(&list, id)?;
    let mut human = HumanOutput::new(format!("prio edit: {}", view.label));
    push_task_summary(&mut human, &view, ws.config.display.show_ids);
    if moved.len() > 1 {
        human.push_detail(format!("{} grouped tasks moved together", moved.len()));
    }
    push_load_warning(&mut human, warning);

    let report = EditReport { task: view, moved };
    emit_success(options.output, "edit", &report, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let LoadedTasks { tasks: list, warning } = ws.storage.load_tasks();
    let show_ids = ws.config.display.show_ids;

    let tasks: Vec<TaskView> = list.iter().map(|task| TaskView::of(task, &list)).collect();

    let mut human = HumanOutput::new(format!("prio list: {} pending", tasks.len()));
    for view in &tasks {
        human.push_detail(view.line(show_ids));
    }
    if tasks.is_empty() {
        human.push_next_step("prio new <label> --priority <n>");
    }
    push_load_warning(&mut human, warning);

    emit_success(options.output, "list", &ListReport { tasks }, Some(&human))
}

pub fn run_chain(options: ChainOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let chain = Chain::parse(&options.text, &ws.config.chain.marker)?;

    let lock = ws.storage.lock_tasks()?;
    let LoadedTasks {
        tasks: mut list,
        warning,
    } = ws.storage.load_tasks();
    let ids = list.add_chain(&chain);
    ws.storage.save_tasks(&list, &lock)?;
    drop(lock);

    let tasks = ids
        .into_iter()
        .map(|id| lookup(&list, id))
        .collect::<Result<Vec<_>>>()?;
    let group = tasks.first().and_then(|view| view.group.clone());
    let show_ids = ws.config.display.show_ids;

    let mut human = HumanOutput::new(format!("prio chain: {} tasks added", tasks.len()));
    if let Some(name) = &group {
        let name = if name.is_empty() { "(anonymous)" } else { name.as_str() };
        human.push_summary("group", name);
    }
    for view in &tasks {
        human.push_detail(view.line(show_ids));
    }
    push_load_warning(&mut human, warning);

    emit_success(options.output, "chain", &ChainReport { group, tasks }, Some(&human))
}

fn lookup(list: &TaskList, id: TaskId) -> Result<TaskView> {
    list.get(id)
        .map(|task| TaskView::of(task, list))
        .ok_or(Error::NotFound(id))
}

fn push_load_warning(human: &mut HumanOutput, warning: Option<String>) {
    if let Some(warning) = warning {
        human.push_warning(warning);
    }
}

fn push_task_summary(human: &mut HumanOutput, view: &TaskView, show_ids: bool) {
    if show_ids {
        human.push_summary("id", view.id.to_string());
    }
    human.push_summary("priority", view.priority.to_string());
    if !view.comment.is_empty() {
        human.push_summary("comment", view.comment.clone());
    }
    if let Some(group) = view.group.as_deref().filter(|name| !name.is_empty()) {
        human.push_summary("group", group);
    }
}

/// Forwards to the daily archive and keeps a copy of the last record for
/// the command report.
struct Recording<'a, S: ArchiveSink> {
    inner: &'a mut S,
    last: Option<ArchiveRecord>,
}

impl<S: ArchiveSink> ArchiveSink for Recording<'_, S> {
    fn append(&mut self, record: &ArchiveRecord, day: chrono::NaiveDate) -> Result<()> {
        self.inner.append(record, day)?;
        self.last = Some(record.clone());
        Ok(())
    }
}
