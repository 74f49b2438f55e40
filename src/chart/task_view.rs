//! Task-list layout: one row per drawn item, sub-projects indented under a
//! labelled side bar.

use super::layout::{self, Bar, Frame, LayoutTable, VACATION_COLOR};
use super::primitives::{Group, Line, Rect, Style, Text};
use super::svg::CM;
use crate::calculations::Resolver;
use crate::error::ScheduleResult;
use crate::project::{Project, ProjectNode};
use crate::resource::ResourceId;
use crate::scale;
use crate::task::{Schedulable, ScheduleItem, TaskId};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Centimetres per CSS pixel.
const PX_TO_CM: f64 = 0.0264583;
const DESCRIPTION_WIDTH_PX: f64 = 400.0;
const DESCRIPTION_MARGIN_PX: f64 = 5.0;
const PROJECT_FONT_SIZE: f64 = 18.0;

pub(super) struct TaskView<'r, 'a> {
    pub resolver: &'r mut Resolver<'a>,
    pub frame: Frame,
    pub layout: LayoutTable,
    pub macro_mode: bool,
    pub show_leaves: bool,
    pub show_dates: bool,
}

impl<'r, 'a> TaskView<'r, 'a> {
    /// Draw `project` starting at row `prev_y`. Returns the group and the
    /// number of rows used; an empty or fully hidden project uses none.
    pub fn draw_project(
        &mut self,
        project: &Project,
        prev_y: i64,
        level: usize,
    ) -> ScheduleResult<(Option<Group>, i64)> {
        let schedule = self.resolver.schedule();
        let color = project.color.as_str();
        let named = !project.name.is_empty();
        let mut cy = prev_y + i64::from(named);
        let mut body = Group::new();
        let collapse = self.macro_mode && level > 0;
        let mut macro_drawn = false;
        let mut drawn_leaves: HashSet<(ResourceId, NaiveDate, NaiveDate)> = HashSet::new();

        for child in project.children() {
            match child {
                ProjectNode::Project(sub) => {
                    let (group, height) = self.draw_project(sub, cy, level + 1)?;
                    if let Some(group) = group {
                        body.push(group);
                        cy += height;
                    }
                }
                ProjectNode::Item(id) => {
                    let item = schedule.get(id)?;
                    if collapse && !item.is_milestone() {
                        if macro_drawn {
                            continue;
                        }
                        macro_drawn = true;
                        if let Some(group) = self.draw_macro(project, cy)? {
                            body.push(group);
                            cy += 1;
                        }
                        continue;
                    }

                    let Some(group) = self.draw_item(id, cy, color)? else {
                        continue;
                    };
                    if self.show_leaves {
                        for leave in self.leaves(id, &mut drawn_leaves)? {
                            if let Some((group, _)) = layout::draw_bar(&self.frame, &leave, cy as f64)? {
                                body.push(group);
                            }
                        }
                    }
                    body.push(group);
                    cy += 1;
                }
            }
        }

        let mut framed = Group::new();
        let mut has_side_bar = false;
        if named {
            let in_window = self.project_in_window(project)?;
            if in_window || level == 1 {
                let indent = 0.6 * level as f64 + self.frame.offset;
                framed.push(Text::new(
                    indent + 0.3,
                    prev_y as f64 + 0.7,
                    project.name.as_str(),
                    PROJECT_FONT_SIZE,
                ));
                framed.push(Rect::new(
                    indent + 0.08,
                    prev_y as f64 + 0.5,
                    0.2,
                    (cy - prev_y - 1) as f64 + 0.4,
                    Style::filled(color)
                        .with_stroke(color)
                        .with_stroke_width(0.0)
                        .with_opacity(0.8),
                ));
                has_side_bar = true;
            } else {
                cy -= 1;
            }

            if in_window && level >= 1 && project.show_description {
                let x = scale::offset(
                    self.frame.scale,
                    self.frame.start,
                    self.frame.end,
                    false,
                    false,
                    false,
                )? * self.frame.unit_width;
                if let Some((group, height_px)) =
                    description_box(project, color, x + self.frame.offset, prev_y as f64)
                {
                    body.push(group);
                    let needed = height_px * PX_TO_CM + 1.0;
                    let used = (cy - prev_y) as f64;
                    if used < needed {
                        cy += (needed - used) as i64;
                    }
                }
            }
        }

        let height = cy - prev_y;
        if height == 0 || (height == 1 && has_side_bar) {
            return Ok((None, 0));
        }
        framed.push(body);
        Ok((Some(framed), height))
    }

    fn project_in_window(&mut self, project: &Project) -> ScheduleResult<bool> {
        let (Some(start), Some(end)) = (
            project.start_date(self.resolver)?,
            project.end_date(self.resolver)?,
        ) else {
            return Ok(false);
        };
        let (ws, we) = (self.frame.start, self.frame.end);
        Ok((ws <= start && start <= we) || (ws <= end && end <= we) || (start <= ws && we <= end))
    }

    /// A single bar standing for every task of a collapsed project.
    fn draw_macro(&mut self, project: &Project, y: i64) -> ScheduleResult<Option<Group>> {
        let (Some(start), Some(end)) = (
            project.start_date(self.resolver)?,
            project.end_date(self.resolver)?,
        ) else {
            return Ok(None);
        };
        let mut bar = Bar::new(project.name.as_str(), start, end, &project.color);
        bar.show_dates = self.show_dates;
        Ok(layout::draw_bar(&self.frame, &bar, y as f64)?.map(|(group, _)| group))
    }

    fn draw_item(&mut self, id: &TaskId, y: i64, project_color: &str) -> ScheduleResult<Option<Group>> {
        let schedule = self.resolver.schedule();
        let item = schedule.get(id)?;
        if !item.is_displayed() {
            log::debug!("{id} is hidden");
            return Ok(None);
        }
        let start = self.resolver.start_date(id)?;
        let end = self.resolver.end_date(id)?;

        let drawn = match item {
            Schedulable::Milestone(milestone) => layout::draw_milestone(
                &self.frame,
                &milestone.fullname,
                start,
                &milestone.color,
                self.show_dates,
                y as f64,
            )?,
            Schedulable::Task(task) => {
                let mut names = Vec::with_capacity(task.resources.len());
                for rid in &task.resources {
                    names.push(schedule.get_resource(rid)?.display_name.clone());
                }
                let color = task.color.as_deref().unwrap_or(project_color);
                let mut bar = Bar::new(task.fullname.as_str(), start, end, color);
                bar.percent_done = task.percent_done;
                bar.modified_begin = task.start.is_some_and(|requested| requested != start);
                bar.modified_end = task.stop.is_some_and(|requested| requested != end);
                bar.show_dates = self.show_dates;
                bar.sub_label = (!names.is_empty()).then(|| names.join(" / "));
                layout::draw_bar(&self.frame, &bar, y as f64)?
            }
        };

        Ok(drawn.map(|(group, placement)| {
            self.layout.insert(id.clone(), placement);
            group
        }))
    }

    /// Vacation bars of the task's resources that overlap it, each period
    /// drawn once per project.
    fn leaves(
        &mut self,
        id: &TaskId,
        drawn: &mut HashSet<(ResourceId, NaiveDate, NaiveDate)>,
    ) -> ScheduleResult<Vec<Bar>> {
        let schedule = self.resolver.schedule();
        let item = schedule.get(id)?;
        let mut bars = Vec::new();
        if item.resources().is_empty() {
            return Ok(bars);
        }
        let start = self.resolver.start_date(id)?;
        let end = self.resolver.end_date(id)?;
        for rid in item.resources() {
            for &(from, to) in schedule.get_resource(rid)?.vacations() {
                if to < start || from > end {
                    continue;
                }
                if !drawn.insert((rid.clone(), from, to)) {
                    continue;
                }
                let mut bar = Bar::new(" ", from, to, VACATION_COLOR);
                bar.opacity = 1.0;
                bars.push(bar);
            }
        }
        Ok(bars)
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Framed description at the right edge of the window. Returns the box and
/// its height in pixels.
fn description_box(project: &Project, color: &str, right_x: f64, prev_y: f64) -> Option<(Group, f64)> {
    if project.name.is_empty() {
        return None;
    }
    let font = PROJECT_FONT_SIZE;
    let margin = DESCRIPTION_MARGIN_PX;
    let chars_per_line = (DESCRIPTION_WIDTH_PX / (font / 2.0)) as usize;

    let mut lines = vec![project.name.clone()];
    for paragraph in project.description.split('\n') {
        lines.extend(wrap(paragraph, chars_per_line));
    }

    let title_px = layout::title_width(&project.name, font);
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let width_px = ((title_px.max(longest * font / 2.0) + 2.0 * margin) as i64 as f64)
        .min(DESCRIPTION_WIDTH_PX);
    let height_px = lines.len() as f64 * font + 2.0 * margin;

    let left = right_x + 1.0 - width_px / CM;
    let top = prev_y + 0.5;

    let mut group = Group::new();
    group.push(Line::new(
        (title_px / CM + 1.0, top),
        (left, top),
        Style::stroked("gray").with_dash("15,10").with_stroke_width(1.0),
    ));
    group.push(Rect::new(
        left,
        top,
        width_px / CM,
        height_px / CM,
        Style::filled("white")
            .with_stroke(color)
            .with_stroke_width(3.0)
            .with_opacity(0.8),
    ));
    for (index, line) in lines.iter().enumerate() {
        let baseline = top + (margin / 2.0 + (index + 1) as f64 * font) / CM;
        let text = Text::new(left + 2.0 * margin / CM, baseline, line.as_str(), font);
        group.push(if index == 0 { text.bold() } else { text });
    }
    Some((group, height_px))
}

#[cfg(test)]
mod tests {
    use super::wrap;

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("", 10).is_empty());
    }
}
