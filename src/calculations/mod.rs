pub mod conflicts;
pub mod resolution;

pub use conflicts::{DependencyConflict, VacationConflict};
pub use resolution::{ResolvedSchedule, Resolver};
