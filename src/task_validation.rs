use crate::task::{Schedulable, ScheduleItem};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskValidationError {}

fn describe_limits(item: &Schedulable) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| "None".to_string());
    format!(
        "start: {}, stop: {}, duration: {}",
        show(item.requested_start().map(|d| d.to_string())),
        show(item.requested_stop().map(|d| d.to_string())),
        show(item.duration().map(|d| d.to_string())),
    )
}

/// Date constraints of a single item. Failures are soft: the item is still
/// registered and may become resolvable once dependencies are added.
pub fn validate_item(item: &Schedulable) -> Result<(), TaskValidationError> {
    match item {
        Schedulable::Milestone(milestone) => {
            if milestone.start.is_none() && milestone.depends_on.is_empty() {
                return Err(TaskValidationError::new(format!(
                    "milestone \"{}\" needs a start date or at least one dependency",
                    milestone.fullname
                )));
            }
        }
        Schedulable::Task(task) => {
            let limits = [
                task.start.is_some(),
                task.stop.is_some(),
                task.duration.is_some(),
            ]
            .iter()
            .filter(|set| **set)
            .count();

            if limits == 3 {
                return Err(TaskValidationError::new(format!(
                    "task \"{}\" is over-determined ({}), stop date wins",
                    task.fullname,
                    describe_limits(item)
                )));
            }
            let by_dependencies = task.duration.is_some() && !task.depends_on.is_empty();
            if limits != 2 && !by_dependencies {
                return Err(TaskValidationError::new(format!(
                    "task \"{}\" must be defined by two of three limits ({})",
                    task.fullname,
                    describe_limits(item)
                )));
            }
            if let Some(duration) = task.duration {
                if duration < 0 {
                    return Err(TaskValidationError::new(format!(
                        "task \"{}\" has negative duration {duration}",
                        task.fullname
                    )));
                }
            }
            if let (Some(start), Some(stop)) = (task.start, task.stop) {
                if stop < start {
                    return Err(TaskValidationError::new(format!(
                        "task \"{}\" stops on {stop} before it starts on {start}",
                        task.fullname
                    )));
                }
            }
            if task.percent_done > 100 {
                return Err(TaskValidationError::new(format!(
                    "task \"{}\" has invalid percent_done {} (must be between 0 and 100)",
                    task.fullname, task.percent_done
                )));
            }
        }
    }
    Ok(())
}

/// Identity checks over a whole collection; date constraints stay soft.
pub fn validate_item_collection(items: &[Schedulable]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(items.len());
    for item in items {
        if !seen_ids.insert(item.id()) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                item.id()
            )));
        }
        if item.dependencies().contains(item.id()) {
            return Err(TaskValidationError::new(format!(
                "task {} depends on itself",
                item.id()
            )));
        }
    }
    Ok(())
}
