use crate::calculations::resolution::Resolver;
use crate::calendar::Calendar;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::resource::{self, GroupId, Resource, ResourceGroup, ResourceId};
use crate::task::{Schedulable, ScheduleItem, TaskId};
use crate::task_validation;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Arena holding every task, milestone, resource and group of a plan.
///
/// Cross references (dependencies, assignments, memberships) are ids resolved
/// through the indexes below, so the arena can be cloned or rebuilt without
/// dangling links.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    items: Vec<Schedulable>,
    item_index: HashMap<TaskId, usize>,
    resources: Vec<Resource>,
    resource_index: HashMap<ResourceId, usize>,
    groups: Vec<ResourceGroup>,
    group_index: HashMap<GroupId, usize>,
    diagnostics: Diagnostics,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, resource: Resource) -> ScheduleResult<()> {
        if self.resource_index.contains_key(&resource.id) {
            return Err(ScheduleError::DuplicateResource(resource.id));
        }
        log::debug!("add_resource {}", resource.id);
        self.resource_index
            .insert(resource.id.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    pub fn add_group(&mut self, group: ResourceGroup) -> ScheduleResult<()> {
        if self.group_index.contains_key(&group.id) {
            return Err(ScheduleError::DuplicateGroup(group.id));
        }
        log::debug!("add_group {}", group.id);
        self.group_index.insert(group.id.clone(), self.groups.len());
        self.groups.push(group);
        Ok(())
    }

    /// Record membership on both sides.
    pub fn add_to_group(&mut self, group: &GroupId, resource: &ResourceId) -> ScheduleResult<()> {
        let group_idx = *self
            .group_index
            .get(group)
            .ok_or_else(|| ScheduleError::UnknownGroup(group.clone()))?;
        let resource_idx = *self
            .resource_index
            .get(resource)
            .ok_or_else(|| ScheduleError::UnknownResource(resource.clone()))?;

        self.groups[group_idx].push_member(resource.clone());
        self.resources[resource_idx].groups.insert(group.clone());
        Ok(())
    }

    /// Register a task or milestone.
    ///
    /// Unknown dependencies or resources and duplicate ids are rejected.
    /// Malformed date constraints are only recorded as diagnostics.
    pub fn add_task(&mut self, item: impl Into<Schedulable>) -> ScheduleResult<TaskId> {
        let item = item.into();
        let id = item.id().clone();
        log::debug!("add_task {id}");

        if self.item_index.contains_key(&id) {
            return Err(ScheduleError::DuplicateTask(id));
        }
        if let Some(missing) = item
            .dependencies()
            .iter()
            .find(|dep| !self.item_index.contains_key(*dep))
        {
            return Err(ScheduleError::UnknownTask(missing.clone()));
        }
        if let Some(missing) = item
            .resources()
            .iter()
            .find(|rid| !self.resource_index.contains_key(*rid))
        {
            return Err(ScheduleError::UnknownResource(missing.clone()));
        }

        if let Err(err) = task_validation::validate_item(&item) {
            self.diagnostics.error(
                DiagnosticKind::MalformedConstraints,
                item.fullname(),
                err.to_string(),
            );
        }

        for rid in item.resources() {
            if let Some(&idx) = self.resource_index.get(rid) {
                let tasks = &mut self.resources[idx].tasks;
                if !tasks.contains(&id) {
                    tasks.push(id.clone());
                }
            }
        }

        self.item_index.insert(id.clone(), self.items.len());
        self.items.push(item);
        Ok(id)
    }

    /// Assign a task to a group as a whole.
    pub fn assign_group_task(&mut self, group: &GroupId, task: &TaskId) -> ScheduleResult<()> {
        if !self.item_index.contains_key(task) {
            return Err(ScheduleError::UnknownTask(task.clone()));
        }
        let idx = *self
            .group_index
            .get(group)
            .ok_or_else(|| ScheduleError::UnknownGroup(group.clone()))?;
        let tasks = &mut self.groups[idx].tasks;
        if !tasks.contains(task) {
            tasks.push(task.clone());
        }
        Ok(())
    }

    /// Merge `deps` into the dependencies of `id` and raise its requested
    /// start to the earliest end date among all of its dependencies.
    ///
    /// The start can only move later. On error the dependency list is left as
    /// it was. Previously resolved dates are stale afterwards and must be
    /// recomputed with a fresh [`Resolver`].
    pub fn add_dependency(
        &mut self,
        calendar: &Calendar,
        id: &TaskId,
        deps: &[TaskId],
    ) -> ScheduleResult<()> {
        let idx = *self
            .item_index
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownTask(id.clone()))?;
        if let Some(missing) = deps.iter().find(|dep| !self.item_index.contains_key(*dep)) {
            return Err(ScheduleError::UnknownTask(missing.clone()));
        }

        let previous = self.items[idx].dependencies().to_vec();
        let merged = self.items[idx].dependencies_mut();
        for dep in deps {
            if !merged.contains(dep) {
                merged.push(dep.clone());
            }
        }
        if let Err(err) = DependencyGraph::from_schedule(self).check_acyclic() {
            *self.items[idx].dependencies_mut() = previous;
            return Err(err);
        }

        let floor = match self.dependency_floor(calendar, idx) {
            Ok(floor) => floor,
            Err(err) => {
                *self.items[idx].dependencies_mut() = previous;
                return Err(err);
            }
        };

        if let Some(floor) = floor {
            let item = &mut self.items[idx];
            match item.requested_start() {
                Some(start) if start >= floor => {}
                _ => {
                    log::debug!("add_dependency moves start of {id} to {floor}");
                    item.set_requested_start(floor);
                }
            }
        }
        Ok(())
    }

    /// Earliest resolved end among the dependencies of the item at `idx`.
    fn dependency_floor(
        &self,
        calendar: &Calendar,
        idx: usize,
    ) -> ScheduleResult<Option<NaiveDate>> {
        let mut resolver = Resolver::new(calendar, self);
        let mut floor: Option<NaiveDate> = None;
        for dep in self.items[idx].dependencies() {
            let end = resolver.end_date(dep)?;
            floor = Some(floor.map_or(end, |current| current.min(end)));
        }
        Ok(floor)
    }

    pub fn item(&self, id: &TaskId) -> Option<&Schedulable> {
        self.item_index.get(id).map(|&idx| &self.items[idx])
    }

    pub fn get(&self, id: &TaskId) -> ScheduleResult<&Schedulable> {
        self.item(id)
            .ok_or_else(|| ScheduleError::UnknownTask(id.clone()))
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.item_index.contains_key(id)
    }

    /// Items in registration order.
    pub fn items(&self) -> impl Iterator<Item = &Schedulable> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resource_index.get(id).map(|&idx| &self.resources[idx])
    }

    pub fn get_resource(&self, id: &ResourceId) -> ScheduleResult<&Resource> {
        self.resource(id)
            .ok_or_else(|| ScheduleError::UnknownResource(id.clone()))
    }

    /// Mutable access for adding vacations after registration.
    pub fn resource_mut(&mut self, id: &ResourceId) -> ScheduleResult<&mut Resource> {
        let idx = *self
            .resource_index
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownResource(id.clone()))?;
        Ok(&mut self.resources[idx])
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn group(&self, id: &GroupId) -> Option<&ResourceGroup> {
        self.group_index.get(id).map(|&idx| &self.groups[idx])
    }

    pub fn get_group(&self, id: &GroupId) -> ScheduleResult<&ResourceGroup> {
        self.group(id)
            .ok_or_else(|| ScheduleError::UnknownGroup(id.clone()))
    }

    pub fn group_mut(&mut self, id: &GroupId) -> ScheduleResult<&mut ResourceGroup> {
        let idx = *self
            .group_index
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownGroup(id.clone()))?;
        Ok(&mut self.groups[idx])
    }

    pub fn groups(&self) -> impl Iterator<Item = &ResourceGroup> {
        self.groups.iter()
    }

    /// Groups the resource is a member of.
    pub fn groups_of<'s>(
        &'s self,
        resource: &'s Resource,
    ) -> impl Iterator<Item = &'s ResourceGroup> {
        resource.groups().filter_map(move |gid| self.group(gid))
    }

    pub fn is_resource_available(
        &self,
        calendar: &Calendar,
        id: &ResourceId,
        date: NaiveDate,
    ) -> ScheduleResult<bool> {
        let resource = self.get_resource(id)?;
        Ok(resource::resource_available(
            calendar,
            resource,
            self.groups_of(resource),
            date,
        ))
    }

    /// Available unless the day is closed or the group is on vacation;
    /// otherwise any available member makes the group available.
    pub fn is_group_available(
        &self,
        calendar: &Calendar,
        id: &GroupId,
        date: NaiveDate,
    ) -> ScheduleResult<bool> {
        let group = self.get_group(id)?;
        if calendar.is_excluded(date) || group.is_on_vacation(date) {
            return Ok(false);
        }
        for member in group.members() {
            if self.is_resource_available(calendar, member, date)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Same as [`Schedule::is_resource_available`], unknown ids count as available.
    pub(crate) fn resource_available_or_unknown(
        &self,
        calendar: &Calendar,
        id: &ResourceId,
        date: NaiveDate,
    ) -> bool {
        self.is_resource_available(calendar, id, date)
            .unwrap_or(true)
    }

    /// Problems recorded while the arena was populated.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
