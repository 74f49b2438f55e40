use crate::error::ScheduleError;
use crate::task::Schedulable;
use crate::task_validation;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    Csv(::csv::Error),
    InvalidData(String),
    Schedule(ScheduleError),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::Schedule(err) => write!(f, "schedule error: {err}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<::csv::Error> for PersistenceError {
    fn from(value: ::csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ScheduleError> for PersistenceError {
    fn from(value: ScheduleError) -> Self {
        Self::Schedule(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn validate_items(items: &[Schedulable]) -> PersistenceResult<()> {
    task_validation::validate_item_collection(items)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod csv;
pub mod file;

pub use file::{Plan, PlanDocument, load_plan_from_json, save_plan_to_json};
