use chrono::NaiveDate;
use gantt_tool::resource::Resource;
use gantt_tool::{
    Calendar, DiagnosticKind, Milestone, Project, ProjectNode, Resolver, ResourceId, Schedule,
    Task, TaskId,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tid(value: &str) -> TaskId {
    TaskId::from(value)
}

fn sample() -> (Schedule, Project) {
    let mut schedule = Schedule::new();
    schedule.add_resource(Resource::new("alice", Some("Alice"), None)).unwrap();
    schedule.add_resource(Resource::new("bob", Some("Bob"), None)).unwrap();
    schedule
        .add_task(
            Task::new("spec")
                .with_start(d(2024, 1, 1))
                .with_duration(3)
                .with_resources(["alice"]),
        )
        .unwrap();
    schedule
        .add_task(
            Task::new("build")
                .depends_on(["spec"])
                .with_duration(5)
                .with_resources(["bob", "alice"]),
        )
        .unwrap();
    schedule
        .add_task(Milestone::new("ship").depends_on(["build"]))
        .unwrap();

    let mut phase = Project::new("Phase 1").with_color("#336699");
    phase.add(tid("spec"));
    phase.add(tid("build"));

    let mut root = Project::new("Root");
    root.add(phase);
    root.add(tid("ship"));
    root.add(tid("spec"));
    (schedule, root)
}

#[test]
fn tasks_are_flattened_in_order_without_duplicates() {
    let (_, root) = sample();
    assert_eq!(root.tasks(), vec![tid("spec"), tid("build"), tid("ship")]);
    assert!(root.contains(&tid("build")));
    assert!(!root.contains(&tid("ghost")));
    assert_eq!(root.element_count(), 4);
    assert!(matches!(root.children()[0], ProjectNode::Project(_)));
}

#[test]
fn resources_follow_first_use() {
    let (schedule, root) = sample();
    assert_eq!(
        root.resources(&schedule).unwrap(),
        vec![ResourceId::from("alice"), ResourceId::from("bob")]
    );
}

#[test]
fn project_bounds_aggregate_children() {
    let cal = Calendar::new();
    let (schedule, root) = sample();
    let mut resolver = Resolver::new(&cal, &schedule);

    // build runs 2024-01-04 .. 2024-01-10, ship lands the day after
    assert_eq!(root.start_date(&mut resolver).unwrap(), Some(d(2024, 1, 1)));
    assert_eq!(root.end_date(&mut resolver).unwrap(), Some(d(2024, 1, 11)));

    let ProjectNode::Project(phase) = &root.children()[0] else {
        panic!("first child is the phase");
    };
    assert_eq!(phase.end_date(&mut resolver).unwrap(), Some(d(2024, 1, 10)));
}

#[test]
fn empty_project_has_no_bounds() {
    let cal = Calendar::new();
    let schedule = Schedule::new();
    let project = Project::new("Nothing");
    let mut resolver = Resolver::new(&cal, &schedule);

    assert!(project.is_empty());
    assert_eq!(project.start_date(&mut resolver).unwrap(), None);
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::EmptyProject), 1);
}

#[test]
fn element_count_is_recomputed_after_reset() {
    let (_, mut root) = sample();
    assert_eq!(root.element_count(), 4);
    root.add(tid("build"));
    root.reset();
    assert_eq!(root.element_count(), 5);
}
