//! Overcharge, vacancy and vacation checks over resolved dates.
//!
//! Nothing here moves a date; every finding is reported and left to the
//! caller.

use super::resolution::Resolver;
use crate::diagnostics::DiagnosticKind;
use crate::error::ScheduleResult;
use crate::resource::{GroupId, ResourceId};
use crate::task::{ScheduleItem, TaskId};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Task full names claiming a resource, per working day.
pub type DailyLoad = BTreeMap<NaiveDate, Vec<String>>;

/// A resource assigned to a task on a day it is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacationConflict {
    pub resource: ResourceId,
    pub date: NaiveDate,
    pub task: TaskId,
}

/// A task whose resolved start does not respect one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyConflict {
    pub task: TaskId,
    pub dependency: TaskId,
    pub start: NaiveDate,
    pub dependency_end: NaiveDate,
}

impl<'a> Resolver<'a> {
    /// Calendar working days between the resolved start and end of `id`.
    pub fn working_days(&mut self, id: &TaskId) -> ScheduleResult<Vec<NaiveDate>> {
        let start = self.start_date(id)?;
        let end = self.end_date(id)?;
        Ok(self.calendar().working_days_in_range(start, end))
    }

    fn add_task_load(&mut self, load: &mut DailyLoad, id: &TaskId) -> ScheduleResult<()> {
        let schedule = self.schedule();
        let name = schedule.get(id)?.fullname().to_string();
        for day in self.working_days(id)? {
            load.entry(day).or_default().push(name.clone());
        }
        Ok(())
    }

    fn resource_load(&mut self, id: &ResourceId) -> ScheduleResult<DailyLoad> {
        let schedule = self.schedule();
        let resource = schedule.get_resource(id)?;
        let mut load = DailyLoad::new();
        for task in resource.tasks() {
            self.add_task_load(&mut load, task)?;
        }
        Ok(load)
    }

    /// Days on which the resource carries more than one task, or every
    /// claimed day when `all_tasks` is set.
    pub fn resource_conflicts(
        &mut self,
        id: &ResourceId,
        all_tasks: bool,
    ) -> ScheduleResult<DailyLoad> {
        let load = self.resource_load(id)?;
        if all_tasks {
            return Ok(load);
        }

        let mut overcharged = DailyLoad::new();
        for (day, tasks) in load {
            if tasks.len() > 1 {
                self.diagnostics_mut().warn(
                    DiagnosticKind::ResourceOvercharge,
                    id.to_string(),
                    format!(
                        "resource \"{id}\" has more than one task on day {day} / {tasks:?}"
                    ),
                );
                overcharged.insert(day, tasks);
            }
        }
        Ok(overcharged)
    }

    /// Like [`Resolver::resource_conflicts`], merged over every member and the
    /// group's own tasks. A day is overcharged past the member count.
    pub fn group_conflicts(&mut self, id: &GroupId, all_tasks: bool) -> ScheduleResult<DailyLoad> {
        let schedule = self.schedule();
        let group = schedule.get_group(id)?;

        let mut load = DailyLoad::new();
        for member in group.members() {
            for (day, tasks) in self.resource_load(member)? {
                load.entry(day).or_default().extend(tasks);
            }
        }
        for task in group.tasks() {
            self.add_task_load(&mut load, task)?;
        }
        if all_tasks {
            return Ok(load);
        }

        let capacity = group.members().len();
        let mut overcharged = DailyLoad::new();
        for (day, tasks) in load {
            if tasks.len() > capacity {
                self.diagnostics_mut().warn(
                    DiagnosticKind::ResourceOvercharge,
                    id.to_string(),
                    format!(
                        "group \"{id}\" has more than {capacity} tasks on day {day} / {tasks:?}"
                    ),
                );
                overcharged.insert(day, tasks);
            }
        }
        Ok(overcharged)
    }

    /// True when the resource is available and unassigned on every worked
    /// weekday of `from..=to`. Excluded dates are checked like any other day,
    /// so a closing day makes the resource non-vacant. Stops at the first busy
    /// day.
    pub fn is_resource_vacant(
        &mut self,
        id: &ResourceId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ScheduleResult<bool> {
        let load = self.resource_load(id)?;
        let calendar = self.calendar();
        let schedule = self.schedule();
        let days = from
            .iter_days()
            .take_while(|day| *day <= to)
            .filter(|day| !calendar.is_non_working_weekday(*day));
        for day in days {
            if !schedule.is_resource_available(calendar, id, day)? {
                log::debug!("resource {id} is not available on day {day} (vacation or closing day)");
                return Ok(false);
            }
            if let Some(tasks) = load.get(&day) {
                log::debug!("resource {id} is not available on day {day} (other task: {tasks:?})");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Members of the group that are vacant over `from..=to`.
    pub fn group_vacancies(
        &mut self,
        id: &GroupId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ScheduleResult<Vec<ResourceId>> {
        let schedule = self.schedule();
        let group = schedule.get_group(id)?;
        let mut vacant = Vec::new();
        for member in group.members() {
            if self.is_resource_vacant(member, from, to)? {
                vacant.push(member.clone());
            }
        }
        Ok(vacant)
    }

    /// Every (resource, working day) of the task where the assigned resource
    /// is unavailable. Milestones never conflict.
    pub fn vacation_conflicts(&mut self, id: &TaskId) -> ScheduleResult<Vec<VacationConflict>> {
        let schedule = self.schedule();
        let item = schedule.get(id)?;
        let mut conflicts = Vec::new();
        if item.resources().is_empty() {
            return Ok(conflicts);
        }

        let days = self.working_days(id)?;
        let calendar = self.calendar();
        for resource in item.resources() {
            for &day in &days {
                if schedule.is_resource_available(calendar, resource, day)? {
                    continue;
                }
                self.diagnostics_mut().warn(
                    DiagnosticKind::VacationConflict,
                    item.fullname(),
                    format!(
                        "caution, resource \"{resource}\" is assigned to task \"{}\" during vacations on day {day}",
                        item.fullname()
                    ),
                );
                conflicts.push(VacationConflict {
                    resource: resource.clone(),
                    date: day,
                    task: id.clone(),
                });
            }
        }
        Ok(conflicts)
    }

    /// Dependencies of `id` that its resolved start does not respect: on or
    /// before a task dependency's end, or before a milestone's day.
    pub fn dependency_conflicts(&mut self, id: &TaskId) -> ScheduleResult<Vec<DependencyConflict>> {
        let schedule = self.schedule();
        let item = schedule.get(id)?;
        let start = self.start_date(id)?;
        let mut conflicts = Vec::new();
        for dep in item.dependencies() {
            let dependency_end = self.end_date(dep)?;
            let violated = if schedule.get(dep)?.is_milestone() {
                start < dependency_end
            } else {
                start <= dependency_end
            };
            if violated {
                conflicts.push(DependencyConflict {
                    task: id.clone(),
                    dependency: dep.clone(),
                    start,
                    dependency_end,
                });
            }
        }
        Ok(conflicts)
    }
}
