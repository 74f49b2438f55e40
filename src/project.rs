use crate::calculations::{DependencyConflict, Resolver};
use crate::diagnostics::DiagnosticKind;
use crate::error::ScheduleResult;
use crate::persistence::csv as csv_export;
use crate::resource::ResourceId;
use crate::schedule::Schedule;
use crate::task::{ScheduleItem, TaskId};
use chrono::NaiveDate;
use std::cell::OnceCell;
use std::io::Write;

pub const PROJECT_COLOR: &str = "#9c9ea0";

#[derive(Debug, Clone)]
pub enum ProjectNode {
    Item(TaskId),
    Project(Project),
}

impl From<TaskId> for ProjectNode {
    fn from(id: TaskId) -> Self {
        ProjectNode::Item(id)
    }
}

impl From<&TaskId> for ProjectNode {
    fn from(id: &TaskId) -> Self {
        ProjectNode::Item(id.clone())
    }
}

impl From<Project> for ProjectNode {
    fn from(project: Project) -> Self {
        ProjectNode::Project(project)
    }
}

/// Ordered tree of task ids and sub-projects.
///
/// A project with an empty name is an anonymous grouping node: it indents
/// its children but draws no label.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub color: String,
    pub description: String,
    pub show_description: bool,
    children: Vec<ProjectNode>,
    element_count: OnceCell<usize>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("")
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: PROJECT_COLOR.to_string(),
            description: String::new(),
            show_description: false,
            children: Vec::new(),
            element_count: OnceCell::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>, show: bool) -> Self {
        self.description = description.into();
        self.show_description = show;
        self
    }

    pub fn add(&mut self, node: impl Into<ProjectNode>) {
        self.children.push(node.into());
        self.element_count.take();
    }

    pub fn children(&self) -> &[ProjectNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf items in the whole tree, cached until the next [`Project::add`]
    /// or [`Project::reset`].
    pub fn element_count(&self) -> usize {
        *self.element_count.get_or_init(|| {
            self.children
                .iter()
                .map(|child| match child {
                    ProjectNode::Item(_) => 1,
                    ProjectNode::Project(project) => project.element_count(),
                })
                .sum()
        })
    }

    pub fn reset(&mut self) {
        self.element_count.take();
        for child in &mut self.children {
            if let ProjectNode::Project(project) = child {
                project.reset();
            }
        }
    }

    /// Flattened item ids, first occurrence wins.
    pub fn tasks(&self) -> Vec<TaskId> {
        let mut ids = Vec::new();
        self.collect_tasks(&mut ids);
        ids
    }

    fn collect_tasks(&self, ids: &mut Vec<TaskId>) {
        for child in &self.children {
            match child {
                ProjectNode::Item(id) => {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
                ProjectNode::Project(project) => project.collect_tasks(ids),
            }
        }
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.children.iter().any(|child| match child {
            ProjectNode::Item(item) => item == id,
            ProjectNode::Project(project) => project.contains(id),
        })
    }

    /// Resources assigned anywhere in the tree, in first-use order.
    pub fn resources(&self, schedule: &Schedule) -> ScheduleResult<Vec<ResourceId>> {
        let mut resources: Vec<ResourceId> = Vec::new();
        for id in self.tasks() {
            for rid in schedule.get(&id)?.resources() {
                if !resources.contains(rid) {
                    resources.push(rid.clone());
                }
            }
        }
        Ok(resources)
    }

    /// Earliest resolved start in the tree, `None` for an empty project.
    pub fn start_date(&self, resolver: &mut Resolver<'_>) -> ScheduleResult<Option<NaiveDate>> {
        self.bound(resolver, true)
    }

    /// Latest resolved end in the tree, `None` for an empty project.
    pub fn end_date(&self, resolver: &mut Resolver<'_>) -> ScheduleResult<Option<NaiveDate>> {
        self.bound(resolver, false)
    }

    fn bound(&self, resolver: &mut Resolver<'_>, first: bool) -> ScheduleResult<Option<NaiveDate>> {
        if self.children.is_empty() {
            resolver.diagnostics_mut().warn(
                DiagnosticKind::EmptyProject,
                self.name.as_str(),
                format!("empty project: \"{}\"", self.name),
            );
            return Ok(None);
        }

        let mut bound: Option<NaiveDate> = None;
        for child in &self.children {
            let date = match child {
                ProjectNode::Item(id) if first => Some(resolver.start_date(id)?),
                ProjectNode::Item(id) => Some(resolver.end_date(id)?),
                ProjectNode::Project(project) => project.bound(resolver, first)?,
            };
            bound = match (bound, date) {
                (Some(current), Some(date)) if first => Some(current.min(date)),
                (Some(current), Some(date)) => Some(current.max(date)),
                (current, date) => current.or(date),
            };
        }
        Ok(bound)
    }

    /// Every dependency that a task of this tree starts too early for.
    pub fn dependency_conflicts(
        &self,
        resolver: &mut Resolver<'_>,
    ) -> ScheduleResult<Vec<DependencyConflict>> {
        let mut conflicts = Vec::new();
        for id in self.tasks() {
            conflicts.extend(resolver.dependency_conflicts(&id)?);
        }
        Ok(conflicts)
    }

    /// Semicolon separated export of state, name, dates, duration and
    /// resources for every task.
    ///
    /// When a sink is given, a UTF-8 byte order mark and a header row are
    /// prepended and the text is also written to it.
    pub fn to_csv(
        &self,
        resolver: &mut Resolver<'_>,
        sink: Option<&mut dyn Write>,
    ) -> ScheduleResult<String> {
        let ids = self.tasks();
        if ids.is_empty() {
            resolver.diagnostics_mut().warn(
                DiagnosticKind::EmptyProject,
                self.name.as_str(),
                format!("empty project: \"{}\"", self.name),
            );
            return Ok(String::new());
        }

        let with_header = sink.is_some();
        let text = csv_export::task_rows(resolver, &ids, with_header)?;
        if let Some(sink) = sink {
            sink.write_all(text.as_bytes())?;
        }
        Ok(text)
    }
}
