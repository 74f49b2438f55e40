//! Horizontal placement of bars and milestones inside the visible window,
//! plus the dependency connectors drawn between them.

use super::primitives::{Group, Line, Polygon, Rect, Style, Text};
use super::svg::CM;
use crate::error::ScheduleResult;
use crate::scale::{self, Scale};
use crate::schedule::Schedule;
use crate::task::{ScheduleItem, TaskId};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

pub const VACATION_COLOR: &str = "#999999";
pub const DATE_LABEL_COLOR: &str = "#9b9b9b";
const MODIFIED_MARK_COLOR: &str = "#0000FF";
const CLIPPED_MARK_COLOR: &str = "#000000";
const PROGRESS_COLOR: &str = "#F08000";
const LOWER_BAND_COLOR: &str = "#909090";
const SUB_LABEL_COLOR: &str = "purple";

/// How an item's `[start, end]` sits against the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOverlap {
    Before,
    After,
    Inside,
    ClippedLeft,
    ClippedRight,
    Spans,
}

impl WindowOverlap {
    pub fn classify(start: NaiveDate, end: NaiveDate, first: NaiveDate, last: NaiveDate) -> Self {
        if start >= first && end <= last {
            WindowOverlap::Inside
        } else if start > last {
            WindowOverlap::After
        } else if end < first {
            WindowOverlap::Before
        } else if start < first && end <= last {
            WindowOverlap::ClippedLeft
        } else if start >= first && end > last {
            WindowOverlap::ClippedRight
        } else {
            WindowOverlap::Spans
        }
    }

    pub fn is_visible(self) -> bool {
        !matches!(self, WindowOverlap::Before | WindowOverlap::After)
    }

    pub fn clips_start(self) -> bool {
        matches!(self, WindowOverlap::ClippedLeft | WindowOverlap::Spans)
    }

    pub fn clips_end(self) -> bool {
        matches!(self, WindowOverlap::ClippedRight | WindowOverlap::Spans)
    }
}

/// Geometry shared by every element of one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub scale: Scale,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Width of one time unit, in cm.
    pub unit_width: f64,
    /// Width of the label column left of the time axis, in cm.
    pub offset: f64,
    pub fractional: bool,
    pub title_align_on_left: bool,
}

impl Frame {
    /// Time-unit columns in the window, minus one.
    pub fn columns(&self) -> ScheduleResult<i64> {
        scale::span_length(self.scale, self.start, self.end)
    }

    pub fn overlap(&self, start: NaiveDate, end: NaiveDate) -> WindowOverlap {
        WindowOverlap::classify(start, end, self.start, self.end)
    }

    /// x of `date` relative to the window start, offset column excluded.
    pub fn position(&self, date: NaiveDate) -> ScheduleResult<f64> {
        Ok(scale::offset(self.scale, self.start, date, false, false, false)? * self.unit_width)
    }

    fn length(&self, from: NaiveDate, to: NaiveDate) -> ScheduleResult<f64> {
        Ok((scale::offset(self.scale, from, to, true, false, false)? + 1.0) * self.unit_width)
    }

    fn fraction(&self, date: NaiveDate) -> ScheduleResult<f64> {
        scale::offset(self.scale, self.start, date, false, false, true)
    }

    /// Where `date` falls inside its own time-unit column, as a share of the
    /// column width: mid-column on the day scale, the weekday share of a
    /// week, the day-of-month share of a month.
    pub fn within_column(&self, date: NaiveDate) -> ScheduleResult<f64> {
        match self.scale.ensure_supported()? {
            Scale::Week => {
                let monday =
                    date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                scale::offset(Scale::Week, monday, date, false, false, true)
            }
            Scale::Month => {
                let first = date.with_day(1).unwrap_or(date);
                let month_days = scale::offset(
                    Scale::Day,
                    first,
                    scale::add_months(first, 1),
                    false,
                    false,
                    false,
                )?;
                Ok(f64::from(date.day()) / month_days)
            }
            _ => Ok(0.5),
        }
    }

    /// `(x, width, overlap)` for a bar spanning `start..=end`, or `None` when
    /// it lies entirely outside the window.
    pub fn place(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ScheduleResult<Option<(f64, f64, WindowOverlap)>> {
        let overlap = self.overlap(start, end);
        if !overlap.is_visible() {
            return Ok(None);
        }

        if self.fractional && self.scale == Scale::Week {
            let lo = start.max(self.start);
            let hi = end.min(self.end);
            let x = self.fraction(lo)?;
            let width = self.fraction(hi)? + 1.0 / 7.0 - x;
            return Ok(Some((x * self.unit_width, width * self.unit_width, overlap)));
        }

        let (x, width) = match overlap {
            WindowOverlap::Inside => (self.position(start)?, self.length(start, end)?),
            WindowOverlap::ClippedLeft => (0.0, self.length(self.start, end)?),
            WindowOverlap::ClippedRight => (self.position(start)?, self.length(start, self.end)?),
            WindowOverlap::Spans => (0.0, self.length(self.start, self.end)?),
            WindowOverlap::Before | WindowOverlap::After => return Ok(None),
        };
        Ok(Some((x, width, overlap)))
    }
}

/// Where an item was drawn. `x` values exclude the offset column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_begin: f64,
    pub x_end: f64,
    pub y: f64,
}

/// Placements of one layout pass, keyed by item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTable {
    placements: HashMap<TaskId, Placement>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TaskId, placement: Placement) {
        self.placements.insert(id, placement);
    }

    pub fn get(&self, id: &TaskId) -> Option<&Placement> {
        self.placements.get(id)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn clear(&mut self) {
        self.placements.clear();
    }
}

/// Everything needed to draw one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub color: String,
    pub percent_done: u8,
    /// Resolved start differs from the requested one.
    pub modified_begin: bool,
    /// Resolved end differs from the requested one.
    pub modified_end: bool,
    pub show_dates: bool,
    /// Smaller purple text under the label.
    pub sub_label: Option<String>,
    pub opacity: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate, color: &str) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            color: color.to_string(),
            percent_done: 0,
            modified_begin: false,
            modified_end: false,
            show_dates: false,
            sub_label: None,
            opacity: 0.8,
        }
    }
}

fn mark(x: f64, y: f64, width: f64, height: f64, fill: &str, stroke: &str, opacity: f64) -> Rect {
    Rect::new(
        x,
        y,
        width,
        height,
        Style::filled(fill)
            .with_stroke(stroke)
            .with_stroke_width(1.0)
            .with_opacity(opacity),
    )
}

pub fn draw_bar(frame: &Frame, bar: &Bar, y: f64) -> ScheduleResult<Option<(Group, Placement)>> {
    let Some((x, d, overlap)) = frame.place(bar.start, bar.end)? else {
        return Ok(None);
    };
    let off = frame.offset;
    let tick = frame.unit_width * 0.1;
    let color = bar.color.as_str();
    let opacity = bar.opacity;

    let mut group = Group::new().with_id(&bar.label);
    group.push(Rect::new(
        x + off,
        y + 0.1,
        d,
        0.8,
        Style::filled(color)
            .with_stroke(color)
            .with_stroke_width(2.0)
            .with_opacity(opacity),
    ));
    group.push(mark(x + off, y + 0.6, d, 0.3, LOWER_BAND_COLOR, color, opacity / 4.0));

    if bar.modified_begin {
        group.push(mark(x + off, y + 0.1, tick, 0.4, MODIFIED_MARK_COLOR, color, opacity / 1.5));
    }
    if bar.modified_end {
        group.push(mark(x + d - tick + off, y + 0.1, tick, 0.4, MODIFIED_MARK_COLOR, color, opacity / 1.5));
    }
    if overlap.clips_start() {
        group.push(mark(x + off, y + 0.1, tick, 0.8, CLIPPED_MARK_COLOR, color, opacity / 2.0));
    }
    if overlap.clips_end() {
        group.push(mark(x + d - tick + off, y + 0.1, tick, 0.8, CLIPPED_MARK_COLOR, color, opacity / 2.0));
    }
    if bar.percent_done > 0 {
        let done = d * f64::from(bar.percent_done.min(100)) / 100.0;
        group.push(mark(x + off, y + 0.6, done, 0.3, PROGRESS_COLOR, color, opacity / 3.0));
    }

    let tx = if frame.title_align_on_left { 5.0 } else { x + 0.2 };
    group.push(Text::new(tx + off, y + 0.5, bar.label.as_str(), 15.0));

    if bar.show_dates {
        group.push(
            Text::colored(
                x + off - 0.2,
                y + 0.9,
                bar.start.format("%d/%m/%y").to_string(),
                12.0,
                DATE_LABEL_COLOR,
            )
            .anchored_end(),
        );
        group.push(Text::colored(
            x + off + d + 0.2,
            y + 0.9,
            bar.end.format("%d/%m/%y").to_string(),
            12.0,
            DATE_LABEL_COLOR,
        ));
    }
    if let Some(sub_label) = bar.sub_label.as_deref().filter(|s| !s.is_empty()) {
        group.push(Text::colored(tx + off, y + 0.85, sub_label, 10.0, SUB_LABEL_COLOR));
    }

    Ok(Some((
        group,
        Placement {
            x_begin: x,
            x_end: x + d,
            y,
        },
    )))
}

/// Diamond on the milestone's day. Only drawn when the day is in the window.
pub fn draw_milestone(
    frame: &Frame,
    label: &str,
    date: NaiveDate,
    color: &str,
    show_date: bool,
    y: f64,
) -> ScheduleResult<Option<(Group, Placement)>> {
    if frame.overlap(date, date) != WindowOverlap::Inside {
        return Ok(None);
    }
    let x = frame.position(date)?;
    let off = frame.offset;

    let mut group = Group::new().with_id(label);
    group.push(Polygon {
        points: vec![
            (x + 0.5 + off, y + 0.2),
            (x + 0.8 + off, y + 0.5),
            (x + 0.5 + off, y + 0.8),
            (x + 0.2 + off, y + 0.5),
        ],
        style: Style::filled(color)
            .with_stroke(color)
            .with_stroke_width(2.0)
            .with_opacity(0.85),
    });

    let tx = if frame.title_align_on_left { 0.5 } else { x + 1.0 + off };
    group.push(Text::new(tx, y + 0.5, label, 15.0));
    if show_date {
        group.push(Text::colored(
            x + 1.0 + off,
            y + 0.9,
            date.format("%d/%m/%y").to_string(),
            12.0,
            DATE_LABEL_COLOR,
        ));
    }

    Ok(Some((
        group,
        Placement {
            x_begin: x,
            x_end: x,
            y,
        },
    )))
}

fn connector(from: (f64, f64), to: (f64, f64)) -> Line {
    Line::new(from, to, Style::stroked("black").with_dash("5,3"))
}

/// Dashed connectors from each drawn dependency to each drawn dependent,
/// limited to `members`.
///
/// A connector leaves the dependency's row horizontally and drops onto the
/// dependent. When it would start right of the dependent's first column it
/// detours one row down so it never runs back over the source bar.
pub fn dependency_arrows(
    schedule: &Schedule,
    members: &[TaskId],
    layout: &LayoutTable,
    offset: f64,
) -> ScheduleResult<Group> {
    let mut group = Group::new();
    for id in members {
        let Some(target) = layout.get(id) else {
            continue;
        };
        let item = schedule.get(id)?;
        for dep in item.dependencies() {
            if !members.contains(dep) {
                continue;
            }
            let Some(source) = layout.get(dep) else {
                continue;
            };
            let source_is_milestone = schedule.get(dep)?.is_milestone();
            let lead = if source_is_milestone { 0.9 } else { -0.2 };
            let sx = source.x_end + lead + offset;
            let sy = source.y + 0.5;

            if item.is_milestone() {
                let tx = target.x_begin + 0.5 + offset;
                group.push(connector((sx, sy), (tx, sy)));
                group.push(connector((tx, sy), (tx, target.y)).with_marker());
                continue;
            }

            let tx = target.x_begin + offset;
            if sx <= tx {
                group.push(connector((sx, sy), (tx, sy)));
                group.push(connector((tx, sy), (tx, target.y + 0.5)).with_marker());
            } else {
                let detour_y = source.y + 1.5;
                group.push(connector((sx, sy), (tx + 1.0, sy)));
                group.push(connector((tx + 1.0, sy), (tx + 1.0, detour_y)));
                group.push(connector((tx, detour_y), (tx + 1.0, detour_y)));
                group.push(connector((tx, detour_y), (tx, target.y + 0.5)).with_marker());
            }
        }
    }
    Ok(group)
}

/// Rough rendered width of `text` in user units: capitals count as wider
/// than the rest.
pub(crate) fn title_width(text: &str, font_size: f64) -> f64 {
    let capitals = text.chars().filter(|c| c.is_uppercase()).count() as f64;
    let others = text.chars().count() as f64 - capitals;
    capitals * font_size / 1.5 + others * font_size / 2.0
}

/// [`title_width`] in whole centimetres.
pub(crate) fn title_width_cm(text: &str, font_size: f64) -> i64 {
    (title_width(text, font_size) / CM).round() as i64
}
