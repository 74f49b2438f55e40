//! Conversion of calendar spans into chart time units.

use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Day,
    Week,
    Month,
    /// Reserved, every conversion rejects it.
    Quarter,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Day => "day",
            Scale::Week => "week",
            Scale::Month => "month",
            Scale::Quarter => "quarter",
        }
    }

    pub fn ensure_supported(self) -> ScheduleResult<Self> {
        match self {
            Scale::Quarter => {
                log::error!("CRITICAL scale {self} is not implemented yet");
                Err(ScheduleError::UnsupportedScale(self))
            }
            _ => Ok(self),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Scale::Day),
            "w" | "week" | "weekly" => Ok(Scale::Week),
            "m" | "month" | "monthly" => Ok(Scale::Month),
            "q" | "quarter" | "quarterly" => Ok(Scale::Quarter),
            other => Err(format!("unknown scale '{other}'")),
        }
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn sunday_of(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - date.weekday().num_days_from_monday() as i64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `date` moved by `months`, clamped to the end of the target month.
pub fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
    };
    shifted.unwrap_or(date)
}

/// Whole months and leftover days from `start` to `end`, both negative when
/// `end` precedes `start`.
pub fn month_delta(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    if end < start {
        let (months, days) = month_delta(end, start);
        return (-months, -days);
    }
    let mut months = (end.year() as i64 * 12 + end.month() as i64)
        - (start.year() as i64 * 12 + start.month() as i64);
    let mut anchor = add_months(start, months);
    if anchor > end {
        months -= 1;
        anchor = add_months(start, months);
    }
    (months, (end - anchor).num_days())
}

/// Number of scale units spanned by `start..=end`, minus one.
///
/// Week spans snap outward to Monday and Sunday, month spans count a started
/// month as a whole one.
pub fn span_length(scale: Scale, start: NaiveDate, end: NaiveDate) -> ScheduleResult<i64> {
    match scale.ensure_supported()? {
        Scale::Day => Ok((end - start).num_days()),
        Scale::Week => {
            let first = monday_of(start);
            let last = sunday_of(end);
            Ok((last - first).num_days().div_euclid(7))
        }
        Scale::Month => {
            let (months, days) = month_delta(start, end + Duration::days(1));
            Ok(months - 1 + i64::from(days > 0))
        }
        Scale::Quarter => Err(ScheduleError::UnsupportedScale(scale)),
    }
}

/// Position of `end` relative to `start`, in scale units.
///
/// With `is_duration` the result measures a bar length rather than an
/// instant. `fractional` only affects the week scale, where it adds the
/// weekday of `end` as a two-decimal fraction of a week.
pub fn offset(
    scale: Scale,
    start: NaiveDate,
    end: NaiveDate,
    is_duration: bool,
    milestone: bool,
    fractional: bool,
) -> ScheduleResult<f64> {
    match scale.ensure_supported()? {
        Scale::Day => Ok((end - start).num_days() as f64),
        Scale::Week => {
            let days = (end - start).num_days();
            let longer_than_week = days > 7;
            let mut guess = monday_of(start);
            let snapped = if is_duration {
                monday_of(end)
            } else {
                sunday_of(end)
            };

            let mut weeks = 0i64;
            while guess + Duration::days(6) < snapped {
                weeks += 1;
                guess = guess + Duration::weeks(1);
            }

            if milestone {
                return Ok((weeks - 1) as f64);
            }
            if fractional {
                if longer_than_week {
                    let weekday = end.weekday().num_days_from_monday() as f64;
                    let correction = if is_duration { 1.0 } else { 0.0 };
                    return Ok(weeks as f64 + round2(weekday / 7.0) - correction);
                }
                return Ok(round2(days as f64 / 7.0));
            }
            Ok(weeks as f64)
        }
        Scale::Month => {
            let start = if is_duration {
                start
            } else {
                start.with_day(1).unwrap_or(start)
            };
            Ok(month_delta(start, end).0 as f64)
        }
        Scale::Quarter => Err(ScheduleError::UnsupportedScale(scale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_delta_clamps_to_month_end() {
        assert_eq!(month_delta(d(2024, 1, 31), d(2024, 2, 29)), (1, 0));
        assert_eq!(month_delta(d(2024, 1, 15), d(2024, 3, 14)), (1, 28));
        assert_eq!(month_delta(d(2024, 3, 15), d(2024, 1, 1)), (-2, -14));
    }
}
