//! Resource-lane layout: a label row per resource followed by its tasks,
//! with vacation and overcharge bands.

use super::layout::{self, Bar, Frame, VACATION_COLOR};
use super::primitives::{Group, Line, Rect, Style, Text};
use crate::calculations::Resolver;
use crate::error::ScheduleResult;
use crate::project::PROJECT_COLOR;
use crate::resource::ResourceId;
use crate::scale::{self, Scale};
use crate::task::{ScheduleItem, TaskId};
use chrono::{Duration, NaiveDate};

const OVERCHARGE_COLOR: &str = "#AA0000";
const LABEL_FONT_SIZE: f64 = 15.0;

pub(super) struct ResourceLanes {
    pub frame: Frame,
    pub one_line: bool,
    pub show_title: bool,
    pub show_conflicts: bool,
    pub show_vacations: bool,
    pub resource_on_left: bool,
}

/// Bar merging consecutive tasks of one resource by project affiliation.
struct Aggregate {
    label: String,
    start: NaiveDate,
    end: NaiveDate,
    color: String,
}

impl Aggregate {
    /// Stretch the span so that the label fits, with some margin for
    /// weekends.
    fn fit_label(&mut self, scale: Scale, unit_width: f64) -> ScheduleResult<bool> {
        let span = scale::offset(scale, self.start, self.end, true, false, false)? * unit_width;
        let needed = layout::title_width_cm(&self.label, LABEL_FONT_SIZE) + 2;
        if needed as f64 > span {
            self.end = self.start + Duration::days(needed);
            return Ok(true);
        }
        Ok(false)
    }

    fn bar(&self) -> Bar {
        Bar::new(self.label.as_str(), self.start, self.end, &self.color)
    }
}

impl ResourceLanes {
    fn full_width(&self, columns: i64) -> f64 {
        (columns + 1) as f64 * self.frame.unit_width + 1.0 + self.frame.offset
    }

    /// Draw every resource lane. Returns the drawing and the last used row.
    pub fn draw(
        &self,
        resolver: &mut Resolver<'_>,
        resources: &[ResourceId],
        tasks: &[TaskId],
    ) -> ScheduleResult<(Group, i64)> {
        let schedule = resolver.schedule();
        let calendar = resolver.calendar();
        let frame = self.frame;
        let (ws, we) = (frame.start, frame.end);
        let columns = frame.columns()?;
        let full_width = self.full_width(columns);
        let tu = frame.unit_width;
        let off = frame.offset;

        let mut lanes = Group::new();
        if !self.one_line {
            lanes.push(Line::new(
                (0.0, 2.0),
                ((columns + 1) as f64 + off, 2.0),
                Style::stroked("black"),
            ));
        }

        let mut nline: i64 = if self.show_title { 2 } else { 1 };
        for rid in resources {
            let resource = schedule.get_resource(rid)?;
            let label_row = if self.resource_on_left { nline + 1 } else { nline };

            let mut title = Group::new();
            if self.resource_on_left {
                if let Some(color) = resource.color.as_deref() {
                    title.push(Rect::new(
                        0.0,
                        label_row as f64 + 0.1,
                        off - 0.3,
                        0.8,
                        Style::filled(color)
                            .with_stroke(color)
                            .with_stroke_width(1.0)
                            .with_opacity(0.95),
                    ));
                }
            }
            title.push(Text::new(
                0.3,
                label_row as f64 + 0.7,
                resource.display_name.as_str(),
                18.0,
            ));

            let overcharged = resolver.resource_conflicts(rid, false)?;
            nline += 1;

            let mut vacations = Group::new();
            let mut conflicts = Group::new();
            let band_width = if self.show_conflicts { 0.4 * tu } else { 0.95 * tu };
            let opacity = if frame.scale == Scale::Week { 0.65 / 4.0 } else { 0.65 };
            let mut day = ws;
            while day <= we {
                if !calendar.is_non_working_day(day) {
                    let x = frame.position(day)? + off;
                    if !schedule.is_resource_available(calendar, rid, day)? {
                        vacations.push(Rect::new(
                            x + 0.1,
                            label_row as f64 + 0.1,
                            band_width,
                            0.8,
                            Style::filled(VACATION_COLOR)
                                .with_stroke(VACATION_COLOR)
                                .with_stroke_width(1.0)
                                .with_opacity(opacity),
                        ));
                    }
                    if overcharged.contains_key(&day) {
                        conflicts.push(Rect::new(
                            x + 0.5,
                            label_row as f64 + 0.1,
                            band_width,
                            0.8,
                            Style::filled(OVERCHARGE_COLOR)
                                .with_stroke(OVERCHARGE_COLOR)
                                .with_stroke_width(1.0)
                                .with_opacity(opacity),
                        ));
                    }
                }
                day = day + Duration::days(1);
            }

            let mut task_count = 0;
            let mut aggregate: Option<Aggregate> = None;
            for id in tasks {
                let item = schedule.get(id)?;
                if !item.resources().contains(rid) {
                    continue;
                }
                let start = resolver.start_date(id)?;
                let end = resolver.end_date(id)?;
                let color = item.color().unwrap_or(PROJECT_COLOR);
                let affiliation = item.project().unwrap_or_default();

                if start <= we && ws <= end {
                    task_count += 1;
                    if self.one_line {
                        match aggregate.as_mut() {
                            None => {
                                let mut first = Aggregate {
                                    label: affiliation.to_string(),
                                    start,
                                    end,
                                    color: color.to_string(),
                                };
                                first.fit_label(frame.scale, tu)?;
                                aggregate = Some(first);
                            }
                            Some(current) if current.label.contains(affiliation) => {
                                current.end = current.end.max(end);
                            }
                            Some(current) if start > current.end => {
                                if let Some((group, _)) =
                                    layout::draw_bar(&frame, &current.bar(), nline as f64)?
                                {
                                    lanes.push(group);
                                }
                                *current = Aggregate {
                                    label: affiliation.to_string(),
                                    start,
                                    end,
                                    color: color.to_string(),
                                };
                            }
                            Some(current) => {
                                current.label = format!("{} / {affiliation}", current.label);
                                if !current.fit_label(frame.scale, tu)? {
                                    current.end = current.end.max(end);
                                }
                            }
                        }
                    }
                }

                if !self.one_line {
                    let mut bar = Bar::new(item.fullname(), start, end, color);
                    bar.percent_done = item.percent_done();
                    bar.modified_begin = item.requested_start().is_some_and(|s| s != start);
                    bar.modified_end = item.requested_stop().is_some_and(|s| s != end);
                    bar.sub_label = item.project().map(str::to_string);
                    if let Some((group, _)) = layout::draw_bar(&frame, &bar, nline as f64)? {
                        lanes.push(group);
                        nline += 1;
                    }
                }
            }

            if task_count == 0 {
                nline -= 1;
                continue;
            }

            if let Some(last) = aggregate.as_ref() {
                if let Some((group, _)) = layout::draw_bar(&frame, &last.bar(), nline as f64)? {
                    lanes.push(group);
                }
            }
            if self.resource_on_left || self.show_title {
                lanes.push(title);
                if self.show_vacations {
                    lanes.push(vacations);
                }
                if self.show_conflicts {
                    lanes.push(conflicts);
                }
            }
            if (nline > 0 && self.resource_on_left) || !self.show_title {
                nline -= 1;
            }
            if self.one_line {
                nline += 1;
                lanes.push(Line::new((0.0, nline as f64), (full_width, nline as f64), Style::stroked("black")));
            } else {
                let y = (nline + 1) as f64;
                lanes.push(Line::new((0.0, y), (full_width, y), Style::stroked("black")));
            }
        }

        Ok((lanes, nline))
    }
}
