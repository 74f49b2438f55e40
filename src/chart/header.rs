//! Calendar header, column grid and row grid of a chart.

use super::layout::Frame;
use super::primitives::{Group, Line, Rect, Style, Text};
use super::svg::CM;
use crate::calendar::Calendar;
use crate::error::{ScheduleError, ScheduleResult};
use crate::scale::{self, Scale};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const TODAY_COLOR: &str = "#76e9ff";
const YEAR_COLOR: &str = "#9b9b9b";
const MONTH_COLOR: &str = "#800000";

fn weekday_initial(day: Weekday) -> char {
    match day {
        Weekday::Mon => 'M',
        Weekday::Tue | Weekday::Thu => 'T',
        Weekday::Wed => 'W',
        Weekday::Fri => 'F',
        Weekday::Sat | Weekday::Sun => 'S',
    }
}

struct Labels {
    origin: NaiveDate,
    relative: bool,
}

impl Labels {
    fn year(&self, day: NaiveDate) -> String {
        if self.relative {
            format!("Year A{}", day.year() - self.origin.year() + 1)
        } else {
            day.year().to_string()
        }
    }

    fn month_index(&self, day: NaiveDate) -> i32 {
        (day.year() - self.origin.year()) * 12 + day.month() as i32 - self.origin.month() as i32
            + 1
    }

    fn month(&self, day: NaiveDate) -> String {
        if self.relative {
            format!("Month M{}", self.month_index(day))
        } else {
            day.format("%B").to_string()
        }
    }

    fn week(&self, day: NaiveDate) -> String {
        if self.relative {
            format!("W{}", (day - self.origin).num_days().div_euclid(7) + 1)
        } else {
            format!("W{:02}", day.iso_week().week())
        }
    }

    fn month_number(&self, day: NaiveDate) -> String {
        if self.relative {
            format!("M{}", self.month_index(day))
        } else {
            day.format("%m").to_string()
        }
    }
}

fn year_text(x: f64, content: String) -> Text {
    Text::colored(x, 0.5, content, 20.0, YEAR_COLOR).bold()
}

fn month_text(x: f64, content: String) -> Text {
    Text::colored(x, 1.0, content, 18.0, MONTH_COLOR).bold()
}

fn week_text(x: f64, content: String) -> Text {
    Text::new(x, 1.5, content, 16.0).bold()
}

/// Header labels and grid for `columns + 1` time units over `rows` rows.
///
/// Rows start at y = 2 cm; the header occupies the band above. `relative`
/// replaces absolute dates with positions counted from the window start.
pub fn calendar_header(
    frame: &Frame,
    calendar: &Calendar,
    columns: i64,
    rows: i64,
    today: Option<NaiveDate>,
    relative: bool,
) -> ScheduleResult<Group> {
    let scale = frame.scale.ensure_supported()?;
    let origin = frame.start;
    let tu = frame.unit_width;
    let off = frame.offset;
    let count = columns + 1;
    let bottom = rows as f64 + 2.0;
    let labels = Labels { origin, relative };

    let mut vlines = Group::new()
        .with_id("vlines")
        .with_style(Style::stroked("lightgray"));

    for column in 0..count {
        let (day, is_today, bold) = match scale {
            Scale::Day => {
                let day = origin + Duration::days(column);
                (day, today == Some(day), false)
            }
            Scale::Week => {
                let day = origin + Duration::weeks(column);
                let next = origin + Duration::weeks(column + 1);
                let is_today = today.is_some_and(|t| t.iso_week() == day.iso_week());
                (day, is_today, next.month() != day.month())
            }
            Scale::Month => {
                let day = scale::add_months(origin, column);
                let next = scale::add_months(origin, column + 1);
                let is_today = today.is_some_and(|t| day <= t && t < next);
                (day, is_today, false)
            }
            Scale::Quarter => return Err(ScheduleError::UnsupportedScale(scale)),
        };

        let start_x = column as f64 * tu + off;
        let end_x = (column + 1) as f64 * tu + off;

        vlines.push(Line::new(
            (end_x, 2.0),
            (end_x, bottom),
            Style::default().with_stroke_width(if bold { 8.0 } else { 1.0 }),
        ));

        if let Some(today) = today.filter(|_| is_today) {
            let mark_x = start_x + frame.within_column(today)? * tu;
            vlines.push(Rect::new(
                mark_x,
                1.0,
                0.2,
                rows as f64 + 1.0,
                Style::filled(TODAY_COLOR)
                    .with_stroke("lightgray")
                    .with_stroke_width(0.0)
                    .with_opacity(0.8),
            ));
        }

        match scale {
            Scale::Day => {
                if calendar.is_non_working_day(day) {
                    vlines.push(Rect::new(
                        start_x,
                        2.0,
                        tu,
                        rows as f64,
                        Style::filled("gray")
                            .with_stroke("lightgray")
                            .with_stroke_width(1.0)
                            .with_opacity(0.9),
                    ));
                }
                vlines.push(Text::new(
                    start_x,
                    1.9,
                    format!("{} {:02}", weekday_initial(day.weekday()), day.day()),
                    12.0,
                ));
                if day.day() == 1 && day.month() == 1 {
                    vlines.push(year_text(start_x, labels.year(day)));
                }
                if day.day() == 1 {
                    vlines.push(month_text(start_x, labels.month(day)));
                }
                if day.weekday() == Weekday::Mon {
                    vlines.push(week_text(start_x, labels.week(day)));
                }
            }
            Scale::Week => {
                if day.iso_week().week() == 1 && day.month() == 1 {
                    vlines.push(year_text(start_x, labels.year(day)));
                }
                if day.day() <= 7 {
                    vlines.push(month_text(start_x, labels.month(day)));
                }
                vlines.push(week_text(start_x, labels.week(day)));
            }
            Scale::Month => {
                vlines.push(Text::new(start_x, 1.9, labels.month_number(day), 12.0));
                if day.month() == 1 {
                    vlines.push(year_text(start_x + 2.0 / CM, labels.year(day)));
                    vlines.push(Line::new(
                        (start_x, 0.0),
                        (start_x, bottom),
                        Style::stroked(YEAR_COLOR)
                            .with_dash("2,2")
                            .with_stroke_width(4.0)
                            .with_opacity(0.8),
                    ));
                }
            }
            Scale::Quarter => return Err(ScheduleError::UnsupportedScale(scale)),
        }
    }

    let right = off + count as f64 * tu;
    vlines.push(Line::new((right, 2.0), (right, bottom), Style::default()));

    let mut header = Group::new();
    header.push(vlines);

    let mut hlines = Group::new()
        .with_id("hlines")
        .with_style(Style::stroked("lightgray"));
    for row in 2..=rows + 2 {
        let y = row as f64;
        hlines.push(Line::new((off, y), (right, y), Style::default()));
    }
    header.push(hlines);
    header.push(Line::new((off, 2.0), (right, 2.0), Style::stroked("black")));
    header.push(Line::new((off, bottom), (right, bottom), Style::stroked("black")));

    Ok(header)
}
