use crate::resource::ResourceId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MILESTONE_COLOR: &str = "#FF3030";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unit of work. Two of `start`, `stop` and `duration` should be set, or
/// `duration` together with at least one dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub fullname: String,
    pub start: Option<NaiveDate>,
    pub stop: Option<NaiveDate>,
    /// Working days.
    pub duration: Option<i64>,
    pub depends_on: Vec<TaskId>,
    pub resources: Vec<ResourceId>,
    pub percent_done: u8,
    pub color: Option<String>,
    pub display: bool,
    pub state: String,
    /// Affiliation label, shown under bars in resource lanes.
    pub project: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>) -> Self {
        let id = id.into();
        Self {
            fullname: id.0.clone(),
            id,
            start: None,
            stop: None,
            duration: None,
            depends_on: Vec::new(),
            resources: Vec::new(),
            percent_done: 0,
            color: None,
            display: true,
            state: String::new(),
            project: None,
        }
    }

    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = fullname.into();
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_stop(mut self, stop: NaiveDate) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn depends_on<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_resources<I, R>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceId>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn with_percent_done(mut self, percent_done: u8) -> Self {
        self.percent_done = percent_done;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

/// Zero-duration marker. Its stop is its start and it never holds resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub id: TaskId,
    pub fullname: String,
    pub start: Option<NaiveDate>,
    pub depends_on: Vec<TaskId>,
    pub color: String,
    pub display: bool,
}

impl Milestone {
    pub fn new(id: impl Into<TaskId>) -> Self {
        let id = id.into();
        Self {
            fullname: id.0.clone(),
            id,
            start: None,
            depends_on: Vec::new(),
            color: MILESTONE_COLOR.to_string(),
            display: true,
        }
    }

    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = fullname.into();
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn depends_on<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }
}

/// Read access shared by tasks and milestones.
pub trait ScheduleItem {
    fn id(&self) -> &TaskId;
    fn fullname(&self) -> &str;
    fn requested_start(&self) -> Option<NaiveDate>;
    fn requested_stop(&self) -> Option<NaiveDate>;
    fn duration(&self) -> Option<i64>;
    fn dependencies(&self) -> &[TaskId];
    fn resources(&self) -> &[ResourceId];
    fn color(&self) -> Option<&str>;
    fn is_displayed(&self) -> bool;
    fn state(&self) -> &str;
}

impl ScheduleItem for Task {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn requested_start(&self) -> Option<NaiveDate> {
        self.start
    }

    fn requested_stop(&self) -> Option<NaiveDate> {
        self.stop
    }

    fn duration(&self) -> Option<i64> {
        self.duration
    }

    fn dependencies(&self) -> &[TaskId] {
        &self.depends_on
    }

    fn resources(&self) -> &[ResourceId] {
        &self.resources
    }

    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    fn is_displayed(&self) -> bool {
        self.display
    }

    fn state(&self) -> &str {
        &self.state
    }
}

impl ScheduleItem for Milestone {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn requested_start(&self) -> Option<NaiveDate> {
        self.start
    }

    fn requested_stop(&self) -> Option<NaiveDate> {
        self.start
    }

    fn duration(&self) -> Option<i64> {
        Some(0)
    }

    fn dependencies(&self) -> &[TaskId] {
        &self.depends_on
    }

    fn resources(&self) -> &[ResourceId] {
        &[]
    }

    fn color(&self) -> Option<&str> {
        Some(&self.color)
    }

    fn is_displayed(&self) -> bool {
        self.display
    }

    fn state(&self) -> &str {
        "Milestone"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Schedulable {
    Task(Task),
    Milestone(Milestone),
}

impl Schedulable {
    pub fn is_milestone(&self) -> bool {
        matches!(self, Schedulable::Milestone(_))
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Schedulable::Task(task) => Some(task),
            Schedulable::Milestone(_) => None,
        }
    }

    pub fn percent_done(&self) -> u8 {
        match self {
            Schedulable::Task(task) => task.percent_done,
            Schedulable::Milestone(_) => 0,
        }
    }

    pub fn project(&self) -> Option<&str> {
        match self {
            Schedulable::Task(task) => task.project.as_deref(),
            Schedulable::Milestone(_) => None,
        }
    }

    pub(crate) fn dependencies_mut(&mut self) -> &mut Vec<TaskId> {
        match self {
            Schedulable::Task(task) => &mut task.depends_on,
            Schedulable::Milestone(milestone) => &mut milestone.depends_on,
        }
    }

    pub(crate) fn set_requested_start(&mut self, start: NaiveDate) {
        match self {
            Schedulable::Task(task) => task.start = Some(start),
            Schedulable::Milestone(milestone) => milestone.start = Some(start),
        }
    }

    fn item(&self) -> &dyn ScheduleItem {
        match self {
            Schedulable::Task(task) => task,
            Schedulable::Milestone(milestone) => milestone,
        }
    }
}

impl ScheduleItem for Schedulable {
    fn id(&self) -> &TaskId {
        self.item().id()
    }

    fn fullname(&self) -> &str {
        self.item().fullname()
    }

    fn requested_start(&self) -> Option<NaiveDate> {
        self.item().requested_start()
    }

    fn requested_stop(&self) -> Option<NaiveDate> {
        self.item().requested_stop()
    }

    fn duration(&self) -> Option<i64> {
        self.item().duration()
    }

    fn dependencies(&self) -> &[TaskId] {
        self.item().dependencies()
    }

    fn resources(&self) -> &[ResourceId] {
        self.item().resources()
    }

    fn color(&self) -> Option<&str> {
        self.item().color()
    }

    fn is_displayed(&self) -> bool {
        self.item().is_displayed()
    }

    fn state(&self) -> &str {
        self.item().state()
    }
}

impl From<Task> for Schedulable {
    fn from(task: Task) -> Self {
        Schedulable::Task(task)
    }
}

impl From<Milestone> for Schedulable {
    fn from(milestone: Milestone) -> Self {
        Schedulable::Milestone(milestone)
    }
}
