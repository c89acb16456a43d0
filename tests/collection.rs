use chrono::{Local, NaiveDate, TimeZone};
use prio::archive::{ArchiveSink, MemoryArchive};
use prio::chain::Chain;
use prio::{ArchiveRecord, Error, Task, TaskId, TaskList};

fn labels(list: &TaskList) -> Vec<String> {
    list.iter().map(|task| task.label.clone()).collect()
}

fn at(day: u32, hour: u32) -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 5, day, hour, 0, 0)
        .single()
        .expect("valid time")
}

#[test]
fn head_is_max_priority_with_earliest_tie() {
    let priorities = [2, 7, 7, -1, 5, 7, 0];
    let mut list = TaskList::new();
    for (idx, priority) in priorities.iter().enumerate() {
        list.insert(Task::new(format!("t{idx}"), *priority));

        let inserted = &priorities[..=idx];
        let max = inserted.iter().max().copied().expect("non-empty");
        let first_max = inserted.iter().position(|p| *p == max).expect("max present");
        let head = list.head().expect("head");
        assert_eq!(head.priority(), max);
        assert_eq!(head.label, format!("t{first_max}"));
    }

    let order: Vec<i64> = list.iter().map(Task::priority).collect();
    assert_eq!(order, vec![7, 7, 7, 5, 2, 0, -1]);
    assert_eq!(labels(&list)[..3], ["t1", "t2", "t5"]);
}

#[test]
fn empty_list_signals_needs_input() {
    let list = TaskList::new();
    assert!(list.head().is_none());
    assert!(list.is_empty());
    assert_eq!(list.list_all().count(), 0);
}

#[test]
fn insert_then_remove_restores_prior_order() {
    let mut list = TaskList::new();
    for (label, priority) in [("a", 3), ("b", 1), ("c", 3), ("d", 2)] {
        list.insert(Task::new(label, priority));
    }
    let before = labels(&list);

    let id = list.insert(Task::new("intruder", 3));
    assert_eq!(list.len(), 5);
    let removed = list.remove(id).expect("remove");

    assert_eq!(removed.label, "intruder");
    assert_eq!(labels(&list), before);
}

#[test]
fn remove_twice_fails_the_second_time() {
    let mut list = TaskList::new();
    let id = list.insert(Task::new("once", 1));
    list.remove(id).expect("first remove");
    assert!(matches!(list.remove(id), Err(Error::NotFound(found)) if found == id));
}

#[test]
fn removing_every_member_drops_the_group() {
    let mut list = TaskList::new();
    let chain: Chain = "Laundry:3:Wash->Dry".parse().expect("chain");
    let ids = list.add_chain(&chain);

    let wash = list.remove(ids[0]).expect("remove wash");
    assert_eq!(wash.group(), None);
    let group = list.group_of(ids[1]).expect("still grouped");
    assert_eq!(group.members(), &ids[1..]);

    let dry = list.remove(ids[1]).expect("remove dry");
    assert_eq!(dry.group(), None);
    assert!(list.is_empty());
    assert_eq!(list.groups().count(), 0);
    assert!(list.to_snapshot().groups.is_empty());
}

#[test]
fn group_priority_change_moves_members_by_same_delta() {
    let mut list = TaskList::new();
    list.insert(Task::new("urgent", 10));
    let chain: Chain = "Laundry:3:Wash->Dry->Fold".parse().expect("chain");
    let ids = list.add_chain(&chain);
    list.insert(Task::new("filler", 2));

    // Editing the middle member: 2 -> 12 is a delta of +10.
    list.change_priority(ids[1], 12).expect("change");

    let priorities: Vec<i64> = ids
        .iter()
        .map(|id| list.get(*id).map(Task::priority).expect("pending"))
        .collect();
    assert_eq!(priorities, vec![13, 12, 11]);
    assert_eq!(labels(&list), vec!["Wash", "Dry", "Fold", "urgent", "filler"]);
}

#[test]
fn group_priority_change_keeps_relative_order_on_ties() {
    let mut list = TaskList::new();
    let chain: Chain = "0:a->b".parse().expect("chain");
    let ids = list.add_chain(&chain);
    list.insert(Task::new("x", 5));
    list.insert(Task::new("y", 4));

    // a: 0 -> 5, b: -1 -> 4; each now ties with an older task.
    list.change_priority(ids[0], 5).expect("change");
    assert_eq!(labels(&list), vec!["a", "x", "b", "y"]);
}

#[test]
fn change_priority_of_unknown_task_leaves_list_untouched() {
    let mut list = TaskList::new();
    list.insert(Task::new("a", 1));
    let before = list.clone();

    assert!(matches!(
        list.change_priority(TaskId(40), 9),
        Err(Error::NotFound(_))
    ));
    assert_eq!(list, before);
}

#[test]
fn complete_head_archives_and_shrinks() {
    let mut list = TaskList::new();
    list.insert(Task::new("solo", 1).with_comment("quick"));
    let chain: Chain = "Laundry:3:Wash->Dry".parse().expect("chain");
    list.add_chain(&chain);

    let mut archive = MemoryArchive::default();
    let next = list
        .complete_head(&mut archive, at(1, 9))
        .expect("complete")
        .map(|task| task.label.clone());
    assert_eq!(next.as_deref(), Some("Dry"));
    assert_eq!(list.len(), 2);

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let records = archive.day(day);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label, "Wash");
    assert_eq!(records[0].group.as_deref(), Some("Laundry"));
    assert_eq!(records[0].done_date, at(1, 9));

    list.complete_head(&mut archive, at(1, 10)).expect("complete");
    list.complete_head(&mut archive, at(1, 11)).expect("complete");
    let all: Vec<&str> = archive.records().iter().map(|(_, r)| r.label.as_str()).collect();
    assert_eq!(all, vec!["Wash", "Dry", "solo"]);
    assert_eq!(archive.records()[2].1.group, None);
    assert_eq!(archive.records()[2].1.comment, "quick");
    assert!(list.is_empty());
}

#[test]
fn anonymous_group_archives_empty_name() {
    let mut list = TaskList::new();
    let chain: Chain = "3:Wash->Dry->Fold".parse().expect("chain");
    list.add_chain(&chain);

    let mut archive = MemoryArchive::default();
    list.complete_head(&mut archive, at(2, 8)).expect("complete");
    assert_eq!(archive.records()[0].1.group.as_deref(), Some(""));
}

#[test]
fn complete_head_on_empty_list_changes_nothing() {
    let mut list = TaskList::new();
    let mut archive = MemoryArchive::default();

    let err = list.complete_head(&mut archive, at(1, 9)).expect_err("empty");
    assert!(matches!(err, Error::EmptyCollection));
    assert!(list.is_empty());
    assert!(archive.records().is_empty());
}

struct FailingSink;

impl ArchiveSink for FailingSink {
    fn append(&mut self, _record: &ArchiveRecord, _day: NaiveDate) -> prio::Result<()> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only archive",
        )))
    }
}

#[test]
fn failed_archive_keeps_head_pending() {
    let mut list = TaskList::new();
    list.insert(Task::new("keep me", 1));
    let before = list.clone();

    assert!(list.complete_head(&mut FailingSink, at(1, 9)).is_err());
    assert_eq!(list, before);
}

#[test]
fn chain_tasks_join_one_group_in_chain_order() {
    let mut list = TaskList::new();
    let chain: Chain = "3:Wash->Dry->Fold".parse().expect("chain");
    let ids = list.add_chain(&chain);

    assert_eq!(labels(&list), vec!["Wash", "Dry", "Fold"]);
    let priorities: Vec<i64> = list.iter().map(Task::priority).collect();
    assert_eq!(priorities, vec![3, 2, 1]);

    let group = list.group_of(ids[0]).expect("grouped");
    assert!(group.is_anonymous());
    assert_eq!(group.members(), ids.as_slice());
    for id in &ids {
        assert_eq!(list.get(*id).and_then(Task::group), Some(group.id()));
    }
}

#[test]
fn named_chain_uses_group_name() {
    let mut list = TaskList::new();
    let chain: Chain = "Laundry:3:Wash->Dry->Fold".parse().expect("chain");
    let ids = list.add_chain(&chain);

    let group = list.group_of(ids[2]).expect("grouped");
    assert_eq!(group.name, "Laundry");
    assert_eq!(group.members().len(), 3);
}

#[test]
fn single_label_chain_is_ungrouped() {
    let mut list = TaskList::new();
    let chain: Chain = "4:Alone".parse().expect("chain");
    let ids = list.add_chain(&chain);

    assert_eq!(ids.len(), 1);
    assert!(list.group_of(ids[0]).is_none());
    assert_eq!(list.groups().count(), 0);
}

#[test]
fn named_single_label_chain_is_ungrouped() {
    let mut list = TaskList::new();
    let chain: Chain = "Errands:1:Post office".parse().expect("chain");
    let ids = list.add_chain(&chain);

    assert_eq!(list.get(ids[0]).map(|task| task.label.as_str()), Some("Post office"));
    assert!(list.group_of(ids[0]).is_none());
    assert_eq!(list.groups().count(), 0);

    let mut archive = MemoryArchive::default();
    list.complete_head(&mut archive, at(3, 9)).expect("complete");
    assert_eq!(archive.records()[0].1.group, None);
}

#[test]
fn failed_chain_parse_adds_nothing() {
    let mut list = TaskList::new();
    list.insert(Task::new("existing", 1));
    let before = list.clone();

    let parsed = "Laundry:three:Wash->Dry".parse::<Chain>();
    assert!(matches!(parsed, Err(Error::ChainParse(_))));
    assert_eq!(list, before);
}
