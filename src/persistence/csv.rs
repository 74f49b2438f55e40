use crate::calculations::Resolver;
use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{ScheduleItem, TaskId};
use chrono::NaiveDate;
use serde::Serialize;
use std::io;

const BOM: &str = "\u{feff}";

#[derive(Serialize)]
struct TaskCsvRecord {
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Task Name")]
    name: String,
    #[serde(rename = "Start date")]
    start: NaiveDate,
    #[serde(rename = "End date")]
    end: NaiveDate,
    #[serde(rename = "Duration")]
    duration: Option<i64>,
    #[serde(rename = "Resources")]
    resources: String,
}

/// One `;` separated CRLF row per item, quoting every non-numeric field.
pub fn task_rows(
    resolver: &mut Resolver<'_>,
    ids: &[TaskId],
    with_header: bool,
) -> ScheduleResult<String> {
    let schedule = resolver.schedule();
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(::csv::Terminator::CRLF)
        .quote_style(::csv::QuoteStyle::NonNumeric)
        .has_headers(with_header)
        .from_writer(Vec::new());

    for id in ids {
        let item = schedule.get(id)?;
        let mut resources = Vec::with_capacity(item.resources().len());
        for rid in item.resources() {
            resources.push(schedule.get_resource(rid)?.display_name.clone());
        }
        writer.serialize(TaskCsvRecord {
            state: item.state().to_string(),
            name: item.fullname().to_string(),
            start: resolver.start_date(id)?,
            end: resolver.end_date(id)?,
            duration: item.duration(),
            resources: resources.join(", "),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ScheduleError::Io(err.into_error()))?;
    let rows = String::from_utf8(bytes)
        .map_err(|err| ScheduleError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;

    if with_header {
        Ok(format!("{BOM}{rows}"))
    } else {
        Ok(rows)
    }
}
