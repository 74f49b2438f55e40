use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Non-working weekdays plus explicitly excluded dates.
///
/// Passed by reference into every resolution and layout pass; nothing in the
/// crate keeps a process-wide copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    excluded_dates: BTreeSet<NaiveDate>,
    non_working_weekdays: HashSet<Weekday>,
}

/// Inclusive date range, single days are encoded as `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.from, self.to.unwrap_or(self.from))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "CalendarConfig::default_weekend")]
    non_working_weekdays: Vec<Weekday>,
    #[serde(default)]
    excluded: Vec<DateRange>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            excluded_dates: BTreeSet::new(),
            non_working_weekdays: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl Calendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CalendarConfig) -> ScheduleResult<Self> {
        let mut calendar = Self::default();
        calendar.set_non_working_weekdays(config.non_working_weekdays.iter().copied())?;
        for range in &config.excluded {
            calendar.add_excluded_range(range.from, range.to);
        }
        Ok(calendar)
    }

    pub fn to_config(&self) -> CalendarConfig {
        CalendarConfig::from(self)
    }

    /// Replace the weekday mask. At least one weekday must stay worked.
    pub fn set_non_working_weekdays<I>(&mut self, days: I) -> ScheduleResult<()>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let days: HashSet<Weekday> = days.into_iter().collect();
        if days.len() >= Self::ALL_WEEKDAYS.len() {
            log::error!("refusing a calendar without any working weekday");
            return Err(ScheduleError::NoWorkingDays);
        }
        self.non_working_weekdays = days;
        Ok(())
    }

    /// Exclude `from..=to`, or only `from` when `to` is `None`.
    pub fn add_excluded_range(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
        log::debug!("add_excluded_range from={from} to={to:?}");
        let to = to.unwrap_or(from);
        let mut current = from;
        while current <= to {
            self.excluded_dates.insert(current);
            current = current + Duration::days(1);
        }
    }

    pub fn add_excluded_date(&mut self, date: NaiveDate) {
        self.excluded_dates.insert(date);
    }

    /// Drop every exclusion and restore the Saturday/Sunday weekend.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }

    pub fn is_non_working_weekday(&self, date: NaiveDate) -> bool {
        self.non_working_weekdays.contains(&date.weekday())
    }

    pub fn is_non_working_day(&self, date: NaiveDate) -> bool {
        self.is_non_working_weekday(date) || self.is_excluded(date)
    }

    pub fn non_working_weekdays(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|day| self.non_working_weekdays.contains(day))
            .collect()
    }

    pub fn excluded_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.excluded_dates.iter().copied()
    }

    /// First working day on or after `from`.
    pub fn working_day_on_or_after(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while self.is_non_working_day(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// Last working day on or before `from`.
    pub fn working_day_on_or_before(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while self.is_non_working_day(current) {
            current = current - Duration::days(1);
        }
        current
    }

    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            if !self.is_non_working_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        self.working_days_in_range(start, end).len() as i64
    }
}

impl CalendarConfig {
    pub fn new<I, J>(non_working_weekdays: I, excluded: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = DateRange>,
    {
        let mut weekdays: Vec<Weekday> = non_working_weekdays.into_iter().collect();
        weekdays.sort_by_key(|wd| wd.num_days_from_monday());
        weekdays.dedup();

        let mut excluded: Vec<DateRange> = excluded.into_iter().collect();
        excluded.sort_by_key(|range| range.from);

        Self {
            non_working_weekdays: weekdays,
            excluded,
        }
    }

    fn default_weekend() -> Vec<Weekday> {
        vec![Weekday::Sat, Weekday::Sun]
    }

    pub fn non_working_weekdays(&self) -> &[Weekday] {
        &self.non_working_weekdays
    }

    pub fn excluded(&self) -> &[DateRange] {
        &self.excluded
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig::from(&Calendar::default())
    }
}

impl From<&Calendar> for CalendarConfig {
    fn from(calendar: &Calendar) -> Self {
        // Consecutive excluded dates collapse back into ranges.
        let mut excluded: Vec<DateRange> = Vec::new();
        for date in calendar.excluded_dates() {
            match excluded.last_mut() {
                Some(range) if range.bounds().1 + Duration::days(1) == date => {
                    range.to = Some(date);
                }
                _ => excluded.push(DateRange {
                    from: date,
                    to: None,
                }),
            }
        }

        Self {
            non_working_weekdays: calendar.non_working_weekdays(),
            excluded,
        }
    }
}
