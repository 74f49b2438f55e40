use chrono::NaiveDate;
use gantt_tool::resource::Resource;
use gantt_tool::{
    Calendar, DiagnosticKind, Milestone, Resolver, Schedule, ScheduleError, ScheduleItem, Task,
    TaskId,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn id(value: &str) -> TaskId {
    TaskId::from(value)
}

#[test]
fn duration_counts_working_days_only() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(5))
        .unwrap();
    schedule
        .add_task(Task::new("b").with_start(d(2024, 1, 4)).with_duration(5))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("a")).unwrap(), d(2024, 1, 1));
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 5));

    // Thursday start crosses one weekend
    let start = resolver.start_date(&id("b")).unwrap();
    let end = resolver.end_date(&id("b")).unwrap();
    assert_eq!(end, d(2024, 1, 10));
    assert_eq!(cal.count_working_days(start, end), 5);
    assert!(resolver.diagnostics().is_empty());
}

#[test]
fn milestone_ends_on_its_start() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Milestone::new("m").with_start(d(2024, 3, 15)))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("m")).unwrap(), d(2024, 3, 15));
    assert_eq!(resolver.end_date(&id("m")).unwrap(), d(2024, 3, 15));
}

#[test]
fn milestone_on_weekend_moves_to_monday() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Milestone::new("m").with_start(d(2024, 1, 6)))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.end_date(&id("m")).unwrap(), d(2024, 1, 8));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::StartShifted), 1);
}

#[test]
fn task_after_task_starts_the_next_working_day() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(Task::new("b").depends_on(["a"]).with_duration(2))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 3));
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 4));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 5));
    assert!(resolver.start_date(&id("b")).unwrap() > resolver.end_date(&id("a")).unwrap());
}

#[test]
fn dependent_chain_crosses_weekend() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(5))
        .unwrap();
    schedule
        .add_task(Task::new("b").depends_on(["a"]).with_duration(2))
        .unwrap();
    schedule
        .add_task(Task::new("c").depends_on(["b"]).with_duration(1))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 8));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 9));
    assert_eq!(resolver.start_date(&id("c")).unwrap(), d(2024, 1, 10));
    assert_eq!(resolver.end_date(&id("c")).unwrap(), d(2024, 1, 10));
}

#[test]
fn task_after_milestone_may_start_on_its_day() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Milestone::new("m").with_start(d(2024, 1, 10)))
        .unwrap();
    schedule
        .add_task(Task::new("t").depends_on(["m"]).with_duration(2))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    let milestone_end = resolver.end_date(&id("m")).unwrap();
    let start = resolver.start_date(&id("t")).unwrap();
    assert_eq!(start, d(2024, 1, 10));
    assert!(start >= milestone_end);
    assert_eq!(resolver.end_date(&id("t")).unwrap(), d(2024, 1, 11));
}

#[test]
fn milestone_after_task_lands_the_next_working_day() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(Milestone::new("m").depends_on(["a"]))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("m")).unwrap(), d(2024, 1, 4));
    assert_eq!(resolver.end_date(&id("m")).unwrap(), d(2024, 1, 4));
}

#[test]
fn requested_start_is_pushed_by_dependency() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(
            Task::new("b")
                .with_start(d(2024, 1, 2))
                .with_duration(1)
                .depends_on(["a"]),
        )
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 4));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 4));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::StartShifted), 1);
}

#[test]
fn requested_start_on_weekend_is_advanced_with_warning() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 6)).with_duration(2))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("a")).unwrap(), d(2024, 1, 8));
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 9));

    let shifted: Vec<_> = resolver
        .diagnostics()
        .of_kind(DiagnosticKind::StartShifted)
        .collect();
    assert_eq!(shifted.len(), 1);
    assert!(shifted[0].message.contains("2024-01-08"));
    assert!(shifted[0].to_string().starts_with("WARNING - "));
}

#[test]
fn excluded_day_inside_span_slips_the_end() {
    let mut cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();

    {
        let mut resolver = Resolver::new(&cal, &schedule);
        assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 3));
    }

    cal.add_excluded_date(d(2024, 1, 2));
    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 4));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::EndSlipped), 1);
}

#[test]
fn single_resource_vacation_shifts_dates() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    let mut alice = Resource::new("alice", Some("Alice"), None);
    alice.add_vacation(d(2024, 1, 2), None);
    schedule.add_resource(alice).unwrap();
    schedule.add_resource(Resource::new("bob", None, None)).unwrap();

    schedule
        .add_task(
            Task::new("solo")
                .with_start(d(2024, 1, 1))
                .with_duration(3)
                .with_resources(["alice"]),
        )
        .unwrap();
    schedule
        .add_task(
            Task::new("pair")
                .with_start(d(2024, 1, 1))
                .with_duration(3)
                .with_resources(["alice", "bob"]),
        )
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert!(resolver.non_working_day(&id("solo"), d(2024, 1, 2)).unwrap());
    assert!(!resolver.non_working_day(&id("pair"), d(2024, 1, 2)).unwrap());

    assert_eq!(resolver.end_date(&id("solo")).unwrap(), d(2024, 1, 4));
    // several resources: vacations do not move dates
    assert_eq!(resolver.end_date(&id("pair")).unwrap(), d(2024, 1, 3));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::EndSlipped), 1);
}

#[test]
fn stop_and_duration_walk_backward() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_stop(d(2024, 1, 12)).with_duration(5))
        .unwrap();
    schedule
        .add_task(Task::new("b").with_stop(d(2024, 1, 9)).with_duration(5))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("a")).unwrap(), d(2024, 1, 8));
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 12));
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 3));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 9));
    assert!(resolver.diagnostics().is_empty());
}

#[test]
fn stop_on_weekend_moves_end_back() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_stop(d(2024, 1, 7)))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 5));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::EndSlipped), 1);
}

#[test]
fn late_dependency_violates_fixed_stop() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(5))
        .unwrap();
    schedule
        .add_task(
            Task::new("b")
                .with_stop(d(2024, 1, 5))
                .with_duration(2)
                .depends_on(["a"]),
        )
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 8));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 9));

    let diagnostics = resolver.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::DependencyViolation), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::EndSlipped), 1);
}

#[test]
fn stop_only_with_dependencies_starts_on_stop() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(2))
        .unwrap();
    schedule
        .add_task(Task::new("b").with_stop(d(2024, 1, 5)).depends_on(["a"]))
        .unwrap();
    assert_eq!(
        schedule.diagnostics().count(DiagnosticKind::MalformedConstraints),
        1
    );

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 5));
    assert_eq!(resolver.end_date(&id("b")).unwrap(), d(2024, 1, 5));
}

#[test]
fn underdetermined_task_is_a_hard_error() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule.add_task(Task::new("a").with_duration(3)).unwrap();
    assert_eq!(
        schedule.diagnostics().count(DiagnosticKind::MalformedConstraints),
        1
    );

    let mut resolver = Resolver::new(&cal, &schedule);
    assert!(matches!(
        resolver.end_date(&id("a")),
        Err(ScheduleError::Underdetermined { .. })
    ));
}

#[test]
fn over_determined_task_lets_stop_win() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(
            Task::new("a")
                .with_start(d(2024, 1, 1))
                .with_stop(d(2024, 1, 3))
                .with_duration(10),
        )
        .unwrap();
    assert_eq!(
        schedule.diagnostics().count(DiagnosticKind::MalformedConstraints),
        1
    );

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.end_date(&id("a")).unwrap(), d(2024, 1, 3));
}

#[test]
fn resolution_is_cached_and_reproducible() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(4))
        .unwrap();
    schedule
        .add_task(Task::new("b").depends_on(["a"]).with_duration(3))
        .unwrap();
    schedule
        .add_task(Milestone::new("m").depends_on(["b"]))
        .unwrap();

    let mut resolver = Resolver::new(&cal, &schedule);
    resolver.resolve_all().unwrap();
    let first = resolver.resolved().clone();
    assert_eq!(first.end(&id("b")), resolver.end_date(&id("b")).ok());
    assert_eq!(resolver.start_date(&id("m")).unwrap(), first.start(&id("m")).unwrap());

    resolver.reset();
    assert!(resolver.resolved().is_empty());
    resolver.resolve_all().unwrap();
    assert_eq!(resolver.resolved(), &first);

    let snapshot = resolver.into_resolved();
    let mut resumed = Resolver::with_resolved(&cal, &schedule, snapshot);
    assert_eq!(resumed.end_date(&id("m")).unwrap(), first.end(&id("m")).unwrap());
}

#[test]
fn add_dependency_raises_requested_start() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(Task::new("b").with_start(d(2023, 12, 28)).with_duration(2))
        .unwrap();
    schedule
        .add_task(Task::new("c").with_start(d(2024, 2, 1)).with_duration(1))
        .unwrap();

    schedule.add_dependency(&cal, &id("b"), &[id("a")]).unwrap();
    schedule.add_dependency(&cal, &id("c"), &[id("a")]).unwrap();

    assert_eq!(schedule.get(&id("b")).unwrap().requested_start(), Some(d(2024, 1, 3)));
    assert_eq!(schedule.get(&id("b")).unwrap().dependencies(), &[id("a")]);
    // never moved earlier
    assert_eq!(schedule.get(&id("c")).unwrap().requested_start(), Some(d(2024, 2, 1)));

    let mut resolver = Resolver::new(&cal, &schedule);
    assert_eq!(resolver.start_date(&id("b")).unwrap(), d(2024, 1, 4));
}

#[test]
fn add_dependency_rejects_cycles() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(Task::new("b").depends_on(["a"]).with_duration(2))
        .unwrap();

    let result = schedule.add_dependency(&cal, &id("a"), &[id("b")]);
    assert!(matches!(result, Err(ScheduleError::DependencyCycle { .. })));
    assert!(schedule.get(&id("a")).unwrap().dependencies().is_empty());
}

#[test]
fn add_dependency_on_unresolvable_item_keeps_old_dependencies() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule.add_task(Task::new("u").with_duration(2)).unwrap();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();

    let result = schedule.add_dependency(&cal, &id("a"), &[id("u")]);
    assert!(matches!(result, Err(ScheduleError::Underdetermined { .. })));
    assert!(schedule.get(&id("a")).unwrap().dependencies().is_empty());
    assert_eq!(schedule.get(&id("a")).unwrap().requested_start(), Some(d(2024, 1, 1)));
}

#[test]
fn schedule_rejects_unknown_references_and_duplicates() {
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(1))
        .unwrap();

    assert!(matches!(
        schedule.add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(1)),
        Err(ScheduleError::DuplicateTask(_))
    ));
    assert!(matches!(
        schedule.add_task(Task::new("b").depends_on(["ghost"]).with_duration(1)),
        Err(ScheduleError::UnknownTask(_))
    ));
    assert!(matches!(
        schedule.add_task(
            Task::new("c")
                .with_start(d(2024, 1, 1))
                .with_duration(1)
                .with_resources(["nobody"])
        ),
        Err(ScheduleError::UnknownResource(_))
    ));
    assert_eq!(schedule.len(), 1);
}
