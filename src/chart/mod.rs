//! Chart configuration and rendering of a resolved project.
//!
//! A render pass resets the resolver, checks the dependency graph, picks the
//! visible window and lays every drawn item out on a [`Frame`]. The result is
//! a primitive tree that [`svg::Drawing`] serializes.

pub mod header;
pub mod layout;
pub mod primitives;
mod resource_view;
pub mod svg;
mod task_view;

pub use layout::{Frame, LayoutTable, Placement, WindowOverlap};
pub use svg::Drawing;

use crate::calculations::{Resolver, VacationConflict};
use crate::diagnostics::DiagnosticKind;
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::project::Project;
use crate::resource::ResourceId;
use crate::scale::Scale;
use crate::task::TaskId;
use chrono::NaiveDate;
use primitives::{Line, Rect, Style};
use resource_view::ResourceLanes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use task_view::TaskView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// One row per task, sub-projects indented.
    #[default]
    Tasks,
    /// Like `Tasks`, each sub-project collapsed into a single bar.
    MacroTasks,
    /// One row per resource, tasks merged by project affiliation.
    ResourceLines,
    /// A label row per resource followed by one row per task.
    ResourceTasks,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Tasks => "tasks",
            RenderMode::MacroTasks => "macro_tasks",
            RenderMode::ResourceLines => "resource_lines",
            RenderMode::ResourceTasks => "resource_tasks",
        }
    }

    pub fn is_resource_mode(&self) -> bool {
        matches!(self, RenderMode::ResourceLines | RenderMode::ResourceTasks)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tasks" | "task" => Ok(RenderMode::Tasks),
            "macro" | "macro_tasks" => Ok(RenderMode::MacroTasks),
            "resource_lines" | "resources_one_line" => Ok(RenderMode::ResourceLines),
            "resource_tasks" | "resources" => Ok(RenderMode::ResourceTasks),
            other => Err(format!("unknown render mode '{other}'")),
        }
    }
}

/// Rendering parameters. Every field has a default, so a partial JSON object
/// is a valid chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub scale: Scale,
    pub mode: RenderMode,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub today: Option<NaiveDate>,
    /// Width of one time unit in cm, see [`Chart::unit_width`].
    pub time_unit_width: f64,
    pub fractional_time_units: bool,
    /// Width of the label column left of the time axis, in cm.
    pub offset: f64,
    /// Relative header labels and no date labels next to bars.
    pub t0mode: bool,
    pub show_title: bool,
    pub show_conflicts: bool,
    pub show_vacations: bool,
    pub show_leaves: bool,
    pub title_align_on_left: bool,
    pub resource_on_left: bool,
    /// Resources drawn in resource modes; every resource of the project when unset.
    pub resources: Option<Vec<ResourceId>>,
    pub font_family: String,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            scale: Scale::Day,
            mode: RenderMode::Tasks,
            window_start: None,
            window_end: None,
            today: None,
            time_unit_width: 1.0,
            fractional_time_units: false,
            offset: 0.0,
            t0mode: false,
            show_title: true,
            show_conflicts: true,
            show_vacations: true,
            show_leaves: true,
            title_align_on_left: false,
            resource_on_left: false,
            resources: None,
            font_family: "Verdana".to_string(),
        }
    }
}

/// Output of a render pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub drawing: Drawing,
    pub layout: LayoutTable,
    /// Resource vacation conflicts found in resource modes.
    pub vacation_conflicts: Vec<VacationConflict>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub written: bool,
    pub width_cm: f64,
    pub height_cm: f64,
    pub vacation_conflicts: Vec<VacationConflict>,
}

impl Chart {
    pub fn new(scale: Scale, mode: RenderMode) -> Self {
        Self {
            scale,
            mode,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Time unit width clamped to 1..=10 cm.
    pub fn unit_width(&self) -> f64 {
        if self.time_unit_width.is_finite() {
            self.time_unit_width.clamp(1.0, 10.0)
        } else {
            1.0
        }
    }

    fn visible_window(
        &self,
        resolver: &mut Resolver<'_>,
        project: &Project,
    ) -> ScheduleResult<(NaiveDate, NaiveDate)> {
        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;
        if self.window_start.is_none() || self.window_end.is_none() {
            for id in project.tasks() {
                let start = resolver.start_date(&id)?;
                let end = resolver.end_date(&id)?;
                first = Some(first.map_or(start, |current| current.min(start)));
                last = Some(last.map_or(end, |current| current.max(end)));
            }
        }

        let start = self.window_start.or(first);
        let end = self.window_end.or(last);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            (Some(start), Some(end)) => {
                resolver.diagnostics_mut().critical(
                    DiagnosticKind::InvalidWindow,
                    project.name.as_str(),
                    format!("start date {start} > end_date {end}"),
                );
                Err(ScheduleError::InvalidWindow { start, end })
            }
            _ => Err(ScheduleError::Underdetermined {
                task: TaskId::from(project.name.as_str()),
            }),
        }
    }

    /// Lay the project out. `Ok(None)` when there is nothing to draw: an
    /// empty project, or no resources in a resource mode.
    pub fn render(
        &self,
        resolver: &mut Resolver<'_>,
        project: &Project,
    ) -> ScheduleResult<Option<Rendered>> {
        if let Err(err) = self.scale.ensure_supported() {
            resolver.diagnostics_mut().critical(
                DiagnosticKind::UnsupportedScale,
                self.scale.as_str(),
                format!("scale {} is not implemented yet", self.scale),
            );
            return Err(err);
        }

        let tasks = project.tasks();
        if tasks.is_empty() {
            resolver.diagnostics_mut().warn(
                DiagnosticKind::EmptyProject,
                project.name.as_str(),
                format!("empty project: \"{}\"", project.name),
            );
            return Ok(None);
        }

        resolver.reset();
        DependencyGraph::from_schedule(resolver.schedule()).check_acyclic()?;

        let (start, end) = self.visible_window(resolver, project)?;
        let frame = Frame {
            scale: self.scale,
            start,
            end,
            unit_width: self.unit_width(),
            offset: self.offset,
            fractional: self.fractional_time_units,
            title_align_on_left: self.title_align_on_left,
        };
        log::debug!(
            "render {} from {start} to {end} ({} scale, {} mode)",
            project.name,
            self.scale,
            self.mode
        );

        if self.mode.is_resource_mode() {
            self.render_resources(resolver, project, frame)
        } else {
            self.render_tasks(resolver, project, frame).map(Some)
        }
    }

    fn render_tasks(
        &self,
        resolver: &mut Resolver<'_>,
        project: &Project,
        frame: Frame,
    ) -> ScheduleResult<Rendered> {
        let schedule = resolver.schedule();
        let calendar = resolver.calendar();
        let mut view = TaskView {
            resolver,
            frame,
            layout: LayoutTable::new(),
            macro_mode: self.mode == RenderMode::MacroTasks,
            show_leaves: self.show_leaves,
            show_dates: !self.t0mode,
        };
        let (body, rows) = view.draw_project(project, 2, 0)?;
        let placements = view.layout;
        let arrows =
            layout::dependency_arrows(schedule, &project.tasks(), &placements, frame.offset)?;

        let columns = frame.columns()?;
        let width = frame.offset + (columns + 1) as f64 * frame.unit_width;
        let height = (rows + 3) as f64;

        let mut drawing = Drawing::new(width, height, self.font_family.as_str());
        drawing.push(Rect::new(
            0.0,
            0.0,
            width,
            height,
            Style::filled("white").with_stroke_width(0.0),
        ));
        drawing.push(header::calendar_header(
            &frame,
            calendar,
            columns,
            rows,
            self.today,
            self.t0mode,
        )?);
        if let Some(body) = body {
            drawing.push(body);
        }
        drawing.push(arrows);

        Ok(Rendered {
            drawing,
            layout: placements,
            vacation_conflicts: Vec::new(),
        })
    }

    fn render_resources(
        &self,
        resolver: &mut Resolver<'_>,
        project: &Project,
        frame: Frame,
    ) -> ScheduleResult<Option<Rendered>> {
        let schedule = resolver.schedule();
        let calendar = resolver.calendar();
        let resources = match &self.resources {
            Some(filter) => filter.clone(),
            None => project.resources(schedule)?,
        };
        if resources.is_empty() {
            resolver.diagnostics_mut().warn(
                DiagnosticKind::NoResources,
                project.name.as_str(),
                format!("no resources to draw in project \"{}\"", project.name),
            );
            return Ok(None);
        }

        let tasks = project.tasks();
        let mut vacation_conflicts = Vec::new();
        for id in &tasks {
            vacation_conflicts.extend(resolver.vacation_conflicts(id)?);
        }

        let bands = matches!(self.scale, Scale::Day | Scale::Week);
        let lanes = ResourceLanes {
            frame,
            one_line: self.mode == RenderMode::ResourceLines,
            show_title: self.show_title,
            show_conflicts: self.show_conflicts && bands,
            show_vacations: self.show_vacations && bands,
            resource_on_left: self.resource_on_left,
        };
        let (body, nline) = lanes.draw(resolver, &resources, &tasks)?;

        let columns = frame.columns()?;
        let full_width = (columns + 1) as f64 * frame.unit_width + 1.0 + frame.offset;
        let width = frame.offset + (columns + 1) as f64 * frame.unit_width;
        let height = (nline + 1) as f64;

        let mut drawing = Drawing::new(width, height, self.font_family.as_str());
        drawing.push(Rect::new(
            0.0,
            0.0,
            full_width,
            height,
            Style::filled("white").with_stroke_width(0.0).with_opacity(1.0),
        ));
        drawing.push(Line::new(
            (0.0, height),
            (full_width, height),
            Style::stroked("black").with_stroke_width(2.0),
        ));
        drawing.push(header::calendar_header(
            &frame,
            calendar,
            columns,
            nline - 1,
            self.today,
            self.t0mode,
        )?);
        drawing.push(body);

        Ok(Some(Rendered {
            drawing,
            layout: LayoutTable::new(),
            vacation_conflicts,
        }))
    }

    /// Render and write the SVG to `path`. Nothing is written when
    /// [`Chart::render`] has nothing to draw.
    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        resolver: &mut Resolver<'_>,
        project: &Project,
        path: P,
    ) -> ScheduleResult<RenderOutcome> {
        let Some(rendered) = self.render(resolver, project)? else {
            return Ok(RenderOutcome {
                written: false,
                width_cm: 0.0,
                height_cm: 0.0,
                vacation_conflicts: Vec::new(),
            });
        };
        rendered.drawing.save(path.as_ref())?;
        log::debug!("chart written to {}", path.as_ref().display());
        Ok(RenderOutcome {
            written: true,
            width_cm: rendered.drawing.width,
            height_cm: rendered.drawing.height,
            vacation_conflicts: rendered.vacation_conflicts,
        })
    }
}
