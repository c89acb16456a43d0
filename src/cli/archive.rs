//! prio archive command: browse finished tasks by day.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::Workspace;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::ArchiveRecord;

pub struct ArchiveOptions {
    pub day: Option<NaiveDate>,
    pub days: bool,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct DayReport {
    day: NaiveDate,
    file: PathBuf,
    records: Vec<ArchiveRecord>,
}

#[derive(Serialize)]
struct DaysReport {
    days: Vec<NaiveDate>,
}

pub fn run(options: ArchiveOptions) -> Result<()> {
    let ws = Workspace::open(options.dir)?;
    let archive = ws.storage.archive();

    if options.days {
        let days = archive.days()?;
        let mut human = HumanOutput::new(format!("prio archive: {} days", days.len()));
        for day in &days {
            human.push_detail(day.to_string());
        }
        return emit_success(options.output, "archive", &DaysReport { days }, Some(&human));
    }

    let day = options.day.unwrap_or_else(|| Local::now().date_naive());
    let records = archive.read_day(day)?;
    let file = archive.day_file(day);

    let mut human = HumanOutput::new(format!("prio archive {day}: {} finished", records.len()));
    for record in &records {
        let mut line = format!(
            "{} [{}] {}",
            record.done_date.format("%H:%M"),
            record.priority,
            record.label
        );
        if let Some(group) = record.group.as_deref().filter(|name| !name.is_empty()) {
            line.push_str(&format!(" (group: {group})"));
        }
        if !record.comment.is_empty() {
            line.push_str(&format!(" - {}", record.comment));
        }
        human.push_detail(line);
    }

    let report = DayReport { day, file, records };
    emit_success(options.output, "archive", &report, Some(&human))
}
