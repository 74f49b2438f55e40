use crate::calendar::Calendar;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::Schedule;
use crate::task::{Schedulable, ScheduleItem, TaskId};
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};

/// Resolved start and end dates keyed by task id.
///
/// Both maps are filled lazily by [`Resolver`] and are only ever cleared
/// together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSchedule {
    starts: HashMap<TaskId, NaiveDate>,
    ends: HashMap<TaskId, NaiveDate>,
}

impl ResolvedSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, id: &TaskId) -> Option<NaiveDate> {
        self.starts.get(id).copied()
    }

    pub fn end(&self, id: &TaskId) -> Option<NaiveDate> {
        self.ends.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.starts.clear();
        self.ends.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty() && self.ends.is_empty()
    }
}

/// Memoized date resolution over a [`Schedule`].
///
/// Every item resolves its own dates on first request, pulling the end dates
/// of its dependencies on the way. Results stay cached until [`Resolver::reset`]
/// is called; there is no dirty tracking, so a reset is required after any
/// edit to the calendar, the resources or the tasks.
pub struct Resolver<'a> {
    calendar: &'a Calendar,
    schedule: &'a Schedule,
    resolved: ResolvedSchedule,
    diagnostics: Diagnostics,
    resolving_start: HashSet<TaskId>,
    resolving_end: HashSet<TaskId>,
}

/// Last day of a span of `duration` working days beginning at `start`.
/// Non-working days at the front are skipped before counting begins.
fn walk_forward<F>(start: NaiveDate, duration: i64, non_working: F) -> NaiveDate
where
    F: Fn(NaiveDate) -> bool,
{
    let mut remaining = duration;
    let mut elapsed = 0;
    let mut current = start;
    while remaining > 1 || non_working(current) {
        if !non_working(current) {
            remaining -= 1;
        }
        elapsed += 1;
        current = start + Duration::days(elapsed);
    }
    start + Duration::days(elapsed)
}

/// First day of a span of `duration` working days ending at `stop`.
fn walk_backward<F>(stop: NaiveDate, duration: i64, non_working: F) -> NaiveDate
where
    F: Fn(NaiveDate) -> bool,
{
    if duration <= 0 {
        return stop;
    }
    let mut remaining = duration;
    let mut elapsed = 0;
    let mut current = stop;
    while remaining > 0 {
        if !non_working(current) {
            remaining -= 1;
        }
        elapsed += 1;
        current = stop - Duration::days(elapsed);
    }
    stop - Duration::days(elapsed - 1)
}

impl<'a> Resolver<'a> {
    pub fn new(calendar: &'a Calendar, schedule: &'a Schedule) -> Self {
        Self::with_resolved(calendar, schedule, ResolvedSchedule::new())
    }

    /// Continue from dates resolved by an earlier pass.
    pub fn with_resolved(
        calendar: &'a Calendar,
        schedule: &'a Schedule,
        resolved: ResolvedSchedule,
    ) -> Self {
        Self {
            calendar,
            schedule,
            resolved,
            diagnostics: Diagnostics::new(),
            resolving_start: HashSet::new(),
            resolving_end: HashSet::new(),
        }
    }

    pub fn calendar(&self) -> &'a Calendar {
        self.calendar
    }

    pub fn schedule(&self) -> &'a Schedule {
        self.schedule
    }

    pub fn resolved(&self) -> &ResolvedSchedule {
        &self.resolved
    }

    pub fn into_resolved(self) -> ResolvedSchedule {
        self.resolved
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Forget every resolved date. Recorded diagnostics are kept.
    pub fn reset(&mut self) {
        log::debug!("reset resolved dates");
        self.resolved.clear();
    }

    /// Resolve every item of the schedule, in registration order.
    pub fn resolve_all(&mut self) -> ScheduleResult<()> {
        let schedule = self.schedule;
        for item in schedule.items() {
            self.start_date(item.id())?;
            self.end_date(item.id())?;
        }
        Ok(())
    }

    /// Whether `day` is closed for `id`: a calendar non-working day, or a day
    /// its resource is unavailable when exactly one resource is assigned.
    pub fn non_working_day(&self, id: &TaskId, day: NaiveDate) -> ScheduleResult<bool> {
        let item = self.schedule.get(id)?;
        Ok(self.is_closed(item, day))
    }

    fn is_closed(&self, item: &Schedulable, day: NaiveDate) -> bool {
        if self.calendar.is_non_working_day(day) {
            return true;
        }
        match item.resources() {
            [only] => !self
                .schedule
                .resource_available_or_unknown(self.calendar, only, day),
            _ => false,
        }
    }

    fn advance(&self, item: &Schedulable, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while self.is_closed(item, current) {
            current = current + Duration::days(1);
        }
        current
    }

    fn retreat(&self, item: &Schedulable, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while self.is_closed(item, current) {
            current = current - Duration::days(1);
        }
        current
    }

    pub fn start_date(&mut self, id: &TaskId) -> ScheduleResult<NaiveDate> {
        if let Some(start) = self.resolved.start(id) {
            return Ok(start);
        }
        let schedule = self.schedule;
        let item = schedule.get(id)?;

        if !self.resolving_start.insert(id.clone()) {
            log::error!("dependency cycle while resolving start of {id}");
            return Err(ScheduleError::DependencyCycle { task: id.clone() });
        }
        let result = self.compute_start(item);
        self.resolving_start.remove(id);

        let start = result?;
        log::debug!("start_date {id} = {start}");
        self.resolved.starts.insert(id.clone(), start);
        Ok(start)
    }

    pub fn end_date(&mut self, id: &TaskId) -> ScheduleResult<NaiveDate> {
        if let Some(end) = self.resolved.end(id) {
            return Ok(end);
        }
        let schedule = self.schedule;
        let item = schedule.get(id)?;

        if !self.resolving_end.insert(id.clone()) {
            log::error!("dependency cycle while resolving end of {id}");
            return Err(ScheduleError::DependencyCycle { task: id.clone() });
        }
        let result = self.compute_end(item);
        self.resolving_end.remove(id);

        let end = result?;
        log::debug!("end_date {id} = {end}");
        self.resolved.ends.insert(id.clone(), end);
        Ok(end)
    }

    /// Latest dependency end, where a milestone counts as the day before
    /// its own date and a task as its end date.
    fn dependency_bound(&mut self, item: &Schedulable) -> ScheduleResult<Option<NaiveDate>> {
        let schedule = self.schedule;
        let mut bound: Option<NaiveDate> = None;
        for dep in item.dependencies() {
            let dep_item = schedule.get(dep)?;
            let end = self.end_date(dep)?;
            let contribution = if dep_item.is_milestone() {
                end - Duration::days(1)
            } else {
                end
            };
            bound = Some(bound.map_or(contribution, |current| current.max(contribution)));
        }
        Ok(bound)
    }

    fn compute_start(&mut self, item: &'a Schedulable) -> ScheduleResult<NaiveDate> {
        let deps = item.dependencies();
        match (item.requested_start(), item.requested_stop(), item.duration()) {
            (Some(start), _, _) if deps.is_empty() => {
                let begin = self.advance(item, start);
                if begin > start {
                    self.diagnostics.warn(
                        DiagnosticKind::StartShifted,
                        item.fullname(),
                        format!(
                            "due to vacations, task \"{}\" will not start on {start} but {begin}",
                            item.fullname()
                        ),
                    );
                }
                Ok(begin)
            }
            (Some(start), _, _) => {
                let schedule = self.schedule;
                let mut begin = self.advance(item, start);
                for dep in deps {
                    let dep_item = schedule.get(dep)?;
                    let end = self.end_date(dep)?;
                    if end >= begin {
                        begin = if dep_item.is_milestone() {
                            end
                        } else {
                            end + Duration::days(1)
                        };
                    }
                }
                let begin = self.advance(item, begin);
                if begin > start {
                    self.diagnostics.warn(
                        DiagnosticKind::StartShifted,
                        item.fullname(),
                        format!(
                            "due to dependencies, task \"{}\" will not start on {start} but {begin}",
                            item.fullname()
                        ),
                    );
                }
                Ok(begin)
            }
            (None, Some(stop), None) => {
                let latest = self.retreat(item, stop);
                match self.dependency_bound(item)? {
                    Some(bound) if bound > stop => {
                        let begin = self.advance(item, bound + Duration::days(1));
                        self.report_late_start(item, latest, begin);
                        Ok(begin)
                    }
                    _ => Ok(latest),
                }
            }
            (None, None, Some(_)) if !deps.is_empty() => {
                let bound = self
                    .dependency_bound(item)?
                    .ok_or_else(|| ScheduleError::Underdetermined {
                        task: item.id().clone(),
                    })?;
                Ok(self.advance(item, bound + Duration::days(1)))
            }
            (None, Some(stop), Some(duration)) => {
                let latest = walk_backward(stop, duration, |day| self.is_closed(item, day));
                let Some(bound) = self.dependency_bound(item)? else {
                    return Ok(latest);
                };
                let begin = if bound > latest {
                    bound + Duration::days(1)
                } else {
                    latest
                };
                let begin = self.advance(item, begin);
                if begin > latest {
                    self.report_late_start(item, latest, begin);
                }
                Ok(begin)
            }
            _ => {
                log::error!("task {} has no derivable start date", item.id());
                Err(ScheduleError::Underdetermined {
                    task: item.id().clone(),
                })
            }
        }
    }

    fn report_late_start(&mut self, item: &Schedulable, latest: NaiveDate, begin: NaiveDate) {
        self.diagnostics.error(
            DiagnosticKind::DependencyViolation,
            item.fullname(),
            format!(
                "due to dependencies, task \"{}\" could not be finished on time \
                 (should start at the latest on {latest} but will start on {begin})",
                item.fullname()
            ),
        );
    }

    fn compute_end(&mut self, item: &'a Schedulable) -> ScheduleResult<NaiveDate> {
        if item.is_milestone() {
            return self.start_date(item.id());
        }

        match (item.requested_stop(), item.duration()) {
            (Some(stop), duration) => {
                let start = self.start_date(item.id())?;
                let walked = self.retreat(item, stop);
                let end = match duration {
                    Some(duration) if walked <= start => {
                        walk_forward(start, duration, |day| self.is_closed(item, day))
                    }
                    _ => walked,
                };
                if end != stop {
                    self.diagnostics.warn(
                        DiagnosticKind::EndSlipped,
                        item.fullname(),
                        format!(
                            "task \"{}\" will not be finished on time: end date is changed from {stop} to {end}",
                            item.fullname()
                        ),
                    );
                }
                Ok(end)
            }
            (None, Some(duration)) => {
                let start = self.start_date(item.id())?;
                let end = walk_forward(start, duration, |day| self.is_closed(item, day));
                let calendar = self.calendar;
                let nominal = walk_forward(start, duration, |day| {
                    calendar.is_non_working_weekday(day)
                });
                if end > nominal {
                    self.diagnostics.warn(
                        DiagnosticKind::EndSlipped,
                        item.fullname(),
                        format!(
                            "due to vacations, task \"{}\" will end on {end} instead of {nominal}",
                            item.fullname()
                        ),
                    );
                }
                Ok(end)
            }
            (None, None) => {
                log::error!("task {} has no derivable end date", item.id());
                Err(ScheduleError::Underdetermined {
                    task: item.id().clone(),
                })
            }
        }
    }
}
