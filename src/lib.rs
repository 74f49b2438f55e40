pub mod calculations;
pub mod calendar;
pub mod chart;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod persistence;
pub mod project;
pub mod resource;
pub mod scale;
pub mod schedule;
pub mod task;
pub mod task_validation;

pub use calculations::{ResolvedSchedule, Resolver};
pub use calendar::{Calendar, CalendarConfig, DateRange};
pub use chart::{Chart, RenderMode};
pub use diagnostics::{DiagnosticKind, Diagnostics, Severity};
pub use error::{ScheduleError, ScheduleResult};
pub use project::{Project, ProjectNode};
pub use resource::{GroupId, Resource, ResourceGroup, ResourceId};
pub use scale::Scale;
pub use schedule::Schedule;
pub use task::{Milestone, Schedulable, ScheduleItem, Task, TaskId};
