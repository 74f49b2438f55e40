use crate::calendar::Calendar;
use crate::task::TaskId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Inclusive vacation range; a single day is stored as `(d, d)`.
pub type Period = (NaiveDate, NaiveDate);

fn in_any_period(periods: &[Period], date: NaiveDate) -> bool {
    periods
        .iter()
        .any(|(from, to)| *from <= date && date <= *to)
}

/// A named actor (person, room, machine) that tasks are assigned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    pub color: Option<String>,
    vacations: Vec<Period>,
    pub(crate) groups: BTreeSet<GroupId>,
    pub(crate) tasks: Vec<TaskId>,
}

impl Resource {
    /// A missing display name falls back to the id.
    pub fn new(id: impl Into<ResourceId>, display_name: Option<&str>, color: Option<&str>) -> Self {
        let id = id.into();
        let display_name = display_name
            .map(str::to_string)
            .unwrap_or_else(|| id.0.clone());
        Self {
            id,
            display_name,
            color: color.map(str::to_string),
            vacations: Vec::new(),
            groups: BTreeSet::new(),
            tasks: Vec::new(),
        }
    }

    pub fn add_vacation(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
        let to = to.unwrap_or(from);
        log::debug!("resource {} vacation {from}..={to}", self.id);
        self.vacations.push((from, to));
    }

    pub fn vacations(&self) -> &[Period] {
        &self.vacations
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.iter()
    }

    /// Tasks assigned to this resource, in registration order.
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    pub fn is_on_vacation(&self, date: NaiveDate) -> bool {
        in_any_period(&self.vacations, date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    pub id: GroupId,
    pub name: String,
    members: Vec<ResourceId>,
    vacations: Vec<Period>,
    pub(crate) tasks: Vec<TaskId>,
}

impl ResourceGroup {
    pub fn new(id: impl Into<GroupId>, name: Option<&str>) -> Self {
        let id = id.into();
        let name = name.map(str::to_string).unwrap_or_else(|| id.0.clone());
        Self {
            id,
            name,
            members: Vec::new(),
            vacations: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn add_vacation(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
        self.vacations.push((from, to.unwrap_or(from)));
    }

    pub fn vacations(&self) -> &[Period] {
        &self.vacations
    }

    pub fn members(&self) -> &[ResourceId] {
        &self.members
    }

    pub(crate) fn push_member(&mut self, resource: ResourceId) {
        if !self.members.contains(&resource) {
            self.members.push(resource);
        }
    }

    /// Tasks assigned to the group as a whole rather than to a member.
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    pub fn is_on_vacation(&self, date: NaiveDate) -> bool {
        in_any_period(&self.vacations, date)
    }
}

/// Global exclusions first, then group vacations, then the resource's own.
pub(crate) fn resource_available<'a, G>(
    calendar: &Calendar,
    resource: &Resource,
    groups: G,
    date: NaiveDate,
) -> bool
where
    G: IntoIterator<Item = &'a ResourceGroup>,
{
    if calendar.is_excluded(date) {
        log::trace!("{} unavailable on {date}: closing day", resource.id);
        return false;
    }
    for group in groups {
        if group.is_on_vacation(date) {
            log::trace!("{} unavailable on {date}: group {}", resource.id, group.id);
            return false;
        }
    }
    !resource.is_on_vacation(date)
}
