use super::{PersistenceError, PersistenceResult};
use crate::calendar::{Calendar, CalendarConfig, DateRange};
use crate::chart::Chart;
use crate::project::{Project, ProjectNode, PROJECT_COLOR};
use crate::resource::{GroupId, Resource, ResourceGroup, ResourceId};
use crate::schedule::Schedule;
use crate::task::{Milestone, Schedulable, ScheduleItem, Task, TaskId, MILESTONE_COLOR};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything needed to resolve and draw a plan.
#[derive(Debug, Clone)]
pub struct Plan {
    pub calendar: Calendar,
    pub schedule: Schedule,
    pub project: Project,
    pub chart: Option<Chart>,
}

/// On-disk JSON shape of a [`Plan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub vacations: Vec<DateRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<ResourceId>,
    #[serde(default)]
    pub vacations: Vec<DateRange>,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default)]
    pub milestone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    #[serde(default)]
    pub resources: Vec<ResourceId>,
    #[serde(default)]
    pub percent_done: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub display: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub show_description: bool,
    #[serde(default)]
    pub children: Vec<ProjectChildRecord>,
}

/// A child is either a bare task id or a nested project object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectChildRecord {
    Task(TaskId),
    Project(ProjectRecord),
}

impl TaskRecord {
    fn into_item(self) -> PersistenceResult<Schedulable> {
        let fullname = self.fullname.unwrap_or_else(|| self.id.0.clone());
        if self.milestone {
            if self.stop.is_some() || self.duration.is_some_and(|d| d != 0) {
                return Err(PersistenceError::InvalidData(format!(
                    "milestone {} cannot carry a stop date or a duration",
                    self.id
                )));
            }
            if !self.resources.is_empty() {
                return Err(PersistenceError::InvalidData(format!(
                    "milestone {} cannot hold resources",
                    self.id
                )));
            }
            let mut milestone = Milestone::new(self.id)
                .with_fullname(fullname)
                .depends_on(self.depends_on)
                .with_display(self.display);
            if let Some(start) = self.start {
                milestone = milestone.with_start(start);
            }
            if let Some(color) = self.color {
                milestone = milestone.with_color(color);
            }
            return Ok(milestone.into());
        }

        let mut task = Task::new(self.id)
            .with_fullname(fullname)
            .depends_on(self.depends_on)
            .with_resources(self.resources)
            .with_percent_done(self.percent_done)
            .with_display(self.display);
        task.start = self.start;
        task.stop = self.stop;
        task.duration = self.duration;
        task.color = self.color;
        task.project = self.project;
        if let Some(state) = self.state {
            task = task.with_state(state);
        }
        Ok(task.into())
    }

    fn from_item(item: &Schedulable) -> Self {
        let fullname = (item.fullname() != item.id().0).then(|| item.fullname().to_string());
        match item {
            Schedulable::Milestone(milestone) => Self {
                id: milestone.id.clone(),
                fullname,
                milestone: true,
                start: milestone.start,
                stop: None,
                duration: None,
                depends_on: milestone.depends_on.clone(),
                resources: Vec::new(),
                percent_done: 0,
                color: (milestone.color != MILESTONE_COLOR).then(|| milestone.color.clone()),
                display: milestone.display,
                state: None,
                project: None,
            },
            Schedulable::Task(task) => Self {
                id: task.id.clone(),
                fullname,
                milestone: false,
                start: task.start,
                stop: task.stop,
                duration: task.duration,
                depends_on: task.depends_on.clone(),
                resources: task.resources.clone(),
                percent_done: task.percent_done,
                color: task.color.clone(),
                display: task.display,
                state: (!task.state.is_empty()).then(|| task.state.clone()),
                project: task.project.clone(),
            },
        }
    }
}

impl ProjectRecord {
    fn into_project(self, schedule: &Schedule) -> PersistenceResult<Project> {
        let mut project = Project::new(self.name)
            .with_color(self.color.unwrap_or_else(|| PROJECT_COLOR.to_string()))
            .with_description(self.description, self.show_description);
        for child in self.children {
            match child {
                ProjectChildRecord::Task(id) => {
                    if !schedule.contains(&id) {
                        return Err(PersistenceError::InvalidData(format!(
                            "project {} refers to unknown task {id}",
                            project.name
                        )));
                    }
                    project.add(id);
                }
                ProjectChildRecord::Project(record) => {
                    project.add(record.into_project(schedule)?);
                }
            }
        }
        Ok(project)
    }

    fn from_project(project: &Project) -> Self {
        let children = project
            .children()
            .iter()
            .map(|child| match child {
                ProjectNode::Item(id) => ProjectChildRecord::Task(id.clone()),
                ProjectNode::Project(sub) => ProjectChildRecord::Project(Self::from_project(sub)),
            })
            .collect();
        Self {
            name: project.name.clone(),
            color: (project.color != PROJECT_COLOR).then(|| project.color.clone()),
            description: project.description.clone(),
            show_description: project.show_description,
            children,
        }
    }
}

fn apply_vacations(periods: &[DateRange], mut add: impl FnMut(NaiveDate, Option<NaiveDate>)) {
    for period in periods {
        add(period.from, period.to);
    }
}

fn period_record(from: NaiveDate, to: NaiveDate) -> DateRange {
    DateRange {
        from,
        to: (to != from).then_some(to),
    }
}

impl PlanDocument {
    /// Build the arena, inserting tasks in dependency order.
    pub fn into_plan(self) -> PersistenceResult<Plan> {
        let calendar = Calendar::from_config(&self.calendar)?;
        let mut schedule = Schedule::new();

        for record in self.resources {
            let mut resource =
                Resource::new(record.id, record.name.as_deref(), record.color.as_deref());
            apply_vacations(&record.vacations, |from, to| resource.add_vacation(from, to));
            schedule.add_resource(resource)?;
        }

        let mut items = Vec::with_capacity(self.tasks.len());
        for record in self.tasks {
            items.push(record.into_item()?);
        }
        super::validate_items(&items)?;

        let mut pending = items;
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for item in pending {
                if item.dependencies().iter().all(|dep| schedule.contains(dep)) {
                    schedule.add_task(item)?;
                } else {
                    deferred.push(item);
                }
            }
            if deferred.len() == before {
                let ids: Vec<String> = deferred.iter().map(|item| item.id().to_string()).collect();
                return Err(PersistenceError::InvalidData(format!(
                    "unresolvable or cyclic dependencies among tasks: {}",
                    ids.join(", ")
                )));
            }
            pending = deferred;
        }

        for record in self.groups {
            let mut group = ResourceGroup::new(record.id.clone(), record.name.as_deref());
            apply_vacations(&record.vacations, |from, to| group.add_vacation(from, to));
            schedule.add_group(group)?;
            for member in &record.members {
                schedule.add_to_group(&record.id, member)?;
            }
            for task in &record.tasks {
                schedule.assign_group_task(&record.id, task)?;
            }
        }

        let project = match self.project {
            Some(record) => record.into_project(&schedule)?,
            None => {
                let mut root = Project::default();
                for item in schedule.items() {
                    root.add(item.id());
                }
                root
            }
        };

        Ok(Plan {
            calendar,
            schedule,
            project,
            chart: self.chart,
        })
    }

    pub fn from_plan(plan: &Plan) -> Self {
        let schedule = &plan.schedule;
        let resources = schedule
            .resources()
            .map(|resource| ResourceRecord {
                id: resource.id.clone(),
                name: (resource.display_name != resource.id.0)
                    .then(|| resource.display_name.clone()),
                color: resource.color.clone(),
                vacations: resource
                    .vacations()
                    .iter()
                    .map(|&(from, to)| period_record(from, to))
                    .collect(),
            })
            .collect();
        let groups = schedule
            .groups()
            .map(|group| GroupRecord {
                id: group.id.clone(),
                name: (group.name != group.id.0).then(|| group.name.clone()),
                members: group.members().to_vec(),
                vacations: group
                    .vacations()
                    .iter()
                    .map(|&(from, to)| period_record(from, to))
                    .collect(),
                tasks: group.tasks().to_vec(),
            })
            .collect();
        let tasks = schedule.items().map(TaskRecord::from_item).collect();

        Self {
            calendar: plan.calendar.to_config(),
            resources,
            groups,
            tasks,
            project: Some(ProjectRecord::from_project(&plan.project)),
            chart: plan.chart.clone(),
        }
    }
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let document: PlanDocument = serde_json::from_reader(BufReader::new(file))?;
    document.into_plan()
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let document = PlanDocument::from_plan(plan);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &document)?;
    Ok(())
}
