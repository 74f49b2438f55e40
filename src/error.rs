use crate::resource::{GroupId, ResourceId};
use crate::scale::Scale;
use crate::task::TaskId;
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Hard failures. Anything recoverable goes through [`crate::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("scale {0} is not supported")]
    UnsupportedScale(Scale),
    #[error("task {task} has no derivable start or end date")]
    Underdetermined { task: TaskId },
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),
    #[error("unknown resource group {0}")]
    UnknownGroup(GroupId),
    #[error("task {0} is already registered")]
    DuplicateTask(TaskId),
    #[error("resource {0} is already registered")]
    DuplicateResource(ResourceId),
    #[error("resource group {0} is already registered")]
    DuplicateGroup(GroupId),
    #[error("dependency cycle through task {task}")]
    DependencyCycle { task: TaskId },
    #[error("start date {start} > end date {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("calendar requires at least one working weekday")]
    NoWorkingDays,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
