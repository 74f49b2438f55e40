use chrono::NaiveDate;
use gantt_tool::chart::header::TODAY_COLOR;
use gantt_tool::chart::layout::dependency_arrows;
use gantt_tool::chart::primitives::{Element, Group, Line};
use gantt_tool::chart::{LayoutTable, Placement};
use gantt_tool::resource::Resource;
use gantt_tool::{
    Calendar, Chart, DiagnosticKind, Milestone, Project, RenderMode, Resolver, Scale, Schedule,
    ScheduleError, Severity, Task, TaskId,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tid(value: &str) -> TaskId {
    TaskId::from(value)
}

fn sample() -> (Schedule, Project) {
    let mut schedule = Schedule::new();
    let mut alice = Resource::new("alice", Some("Alice"), Some("#ff9900"));
    alice.add_vacation(d(2024, 1, 8), None);
    schedule.add_resource(alice).unwrap();
    schedule.add_resource(Resource::new("bob", Some("Bob"), None)).unwrap();
    schedule
        .add_task(
            Task::new("spec")
                .with_fullname("Specification")
                .with_start(d(2024, 1, 1))
                .with_duration(3)
                .with_resources(["alice"])
                .with_percent_done(50),
        )
        .unwrap();
    schedule
        .add_task(
            Task::new("build")
                .with_fullname("Build")
                .depends_on(["spec"])
                .with_duration(5)
                .with_resources(["alice", "bob"])
                .with_project("Core"),
        )
        .unwrap();
    schedule
        .add_task(
            Milestone::new("ship")
                .with_fullname("Ship")
                .depends_on(["build"]),
        )
        .unwrap();

    let mut phase = Project::new("Phase 1").with_color("#336699");
    phase.add(tid("spec"));
    phase.add(tid("build"));
    let mut root = Project::new("Root");
    root.add(phase);
    root.add(tid("ship"));
    (schedule, root)
}

#[test]
fn empty_project_writes_nothing_and_warns_once() {
    let cal = Calendar::new();
    let schedule = Schedule::new();
    let project = Project::new("Empty");
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.svg");

    let mut resolver = Resolver::new(&cal, &schedule);
    let outcome = Chart::default()
        .render_to_file(&mut resolver, &project, &path)
        .unwrap();

    assert!(!outcome.written);
    assert!(!path.exists());
    let entries = resolver.diagnostics().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, DiagnosticKind::EmptyProject);
    assert_eq!(entries[0].severity, Severity::Warning);
}

#[test]
fn reversed_window_is_a_hard_error() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let chart = Chart::new(Scale::Day, RenderMode::Tasks)
        .with_window(Some(d(2024, 1, 10)), Some(d(2024, 1, 1)));

    let mut resolver = Resolver::new(&cal, &schedule);
    let result = chart.render(&mut resolver, &project);
    assert!(matches!(result, Err(ScheduleError::InvalidWindow { .. })));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::InvalidWindow), 1);

    // the resolver stays usable after the failed pass
    assert_eq!(resolver.end_date(&tid("build")).unwrap(), d(2024, 1, 10));
}

#[test]
fn quarter_scale_is_a_hard_error() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let mut resolver = Resolver::new(&cal, &schedule);

    let result = Chart::new(Scale::Quarter, RenderMode::Tasks).render(&mut resolver, &project);
    assert!(matches!(result, Err(ScheduleError::UnsupportedScale(Scale::Quarter))));
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::UnsupportedScale), 1);
}

#[test]
fn task_chart_places_every_visible_item() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.svg");

    let mut resolver = Resolver::new(&cal, &schedule);
    let chart = Chart::new(Scale::Day, RenderMode::Tasks).with_today(d(2024, 1, 3));
    let outcome = chart.render_to_file(&mut resolver, &project, &path).unwrap();
    assert!(outcome.written);
    // eleven day columns, one centimetre each
    assert_eq!(outcome.width_cm, 11.0);

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("<svg"));
    assert!(svg.contains(">Specification</text>"));
    assert!(svg.contains(">Phase 1</text>"));
    assert!(svg.contains("marker-end"));
    assert!(svg.contains(TODAY_COLOR));

    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = chart.render(&mut resolver, &project).unwrap().unwrap();
    let spec = rendered.layout.get(&tid("spec")).unwrap();
    let build = rendered.layout.get(&tid("build")).unwrap();
    let ship = rendered.layout.get(&tid("ship")).unwrap();
    assert_eq!(spec.x_begin, 0.0);
    assert_eq!(spec.x_end, 3.0);
    assert_eq!(build.x_begin, 3.0);
    assert_eq!(build.x_end, 10.0);
    assert_eq!(ship.x_begin, 10.0);
    assert!(spec.y < build.y && build.y < ship.y);

    let texts = rendered.drawing.root.texts();
    assert!(texts.contains(&"01/01/24"));
    assert!(texts.contains(&"W01"));
    assert!(texts.contains(&"Alice / Bob"));
}

#[test]
fn window_clips_items() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let chart = Chart::new(Scale::Day, RenderMode::Tasks)
        .with_window(Some(d(2024, 1, 4)), Some(d(2024, 1, 9)));

    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = chart.render(&mut resolver, &project).unwrap().unwrap();
    assert!(rendered.layout.get(&tid("spec")).is_none());
    assert!(rendered.layout.get(&tid("ship")).is_none());
    let build = rendered.layout.get(&tid("build")).unwrap();
    assert_eq!(build.x_begin, 0.0);
    assert_eq!(build.x_end, 6.0);
    assert_eq!(rendered.drawing.width, 6.0);
}

#[test]
fn hidden_items_are_not_drawn() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(2))
        .unwrap();
    schedule
        .add_task(
            Task::new("b")
                .with_start(d(2024, 1, 1))
                .with_duration(2)
                .with_display(false),
        )
        .unwrap();
    let mut project = Project::default();
    project.add(tid("a"));
    project.add(tid("b"));

    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = Chart::default().render(&mut resolver, &project).unwrap().unwrap();
    assert!(rendered.layout.get(&tid("a")).is_some());
    assert!(rendered.layout.get(&tid("b")).is_none());
    assert_eq!(rendered.layout.len(), 1);
}

#[test]
fn macro_mode_collapses_sub_projects() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = Chart::new(Scale::Day, RenderMode::MacroTasks)
        .render(&mut resolver, &project)
        .unwrap()
        .unwrap();

    assert!(rendered.layout.get(&tid("spec")).is_none());
    assert!(rendered.layout.get(&tid("build")).is_none());
    assert!(rendered.layout.get(&tid("ship")).is_some());
    let texts = rendered.drawing.root.texts();
    assert!(!texts.contains(&"Specification"));
    assert!(texts.iter().filter(|text| **text == "Phase 1").count() >= 2);
}

#[test]
fn relative_mode_hides_dates() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    let mut chart = Chart::new(Scale::Day, RenderMode::Tasks);
    chart.t0mode = true;

    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = chart.render(&mut resolver, &project).unwrap().unwrap();
    let texts = rendered.drawing.root.texts();
    assert!(texts.contains(&"W1"));
    assert!(texts.contains(&"W2"));
    assert!(!texts.contains(&"W01"));
    assert!(!texts.contains(&"01/01/24"));
}

#[test]
fn coarser_scales_render() {
    let cal = Calendar::new();
    let (schedule, project) = sample();
    for scale in [Scale::Week, Scale::Month] {
        for fractional in [false, true] {
            let mut chart = Chart::new(scale, RenderMode::Tasks);
            chart.fractional_time_units = fractional;
            let mut resolver = Resolver::new(&cal, &schedule);
            let rendered = chart.render(&mut resolver, &project).unwrap().unwrap();
            assert!(rendered.layout.get(&tid("build")).is_some(), "{scale}");
            assert!(rendered.drawing.width >= 1.0);
        }
    }
}

#[test]
fn resource_lanes_list_resources_and_vacation_conflicts() {
    let cal = Calendar::new();
    let (schedule, project) = sample();

    for mode in [RenderMode::ResourceTasks, RenderMode::ResourceLines] {
        let mut chart = Chart::new(Scale::Day, mode);
        chart.resource_on_left = true;
        chart.offset = 4.0;
        let mut resolver = Resolver::new(&cal, &schedule);
        let rendered = chart.render(&mut resolver, &project).unwrap().unwrap();

        let texts = rendered.drawing.root.texts();
        assert!(texts.contains(&"Alice"), "{mode}");
        assert!(texts.contains(&"Bob"), "{mode}");
        assert_eq!(rendered.vacation_conflicts.len(), 1);
        assert_eq!(rendered.vacation_conflicts[0].task, tid("build"));
        assert_eq!(rendered.vacation_conflicts[0].date, d(2024, 1, 8));
    }
}

#[test]
fn resource_mode_without_resources_draws_nothing() {
    let cal = Calendar::new();
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(2))
        .unwrap();
    let mut project = Project::new("Solo");
    project.add(tid("a"));

    let mut resolver = Resolver::new(&cal, &schedule);
    let rendered = Chart::new(Scale::Day, RenderMode::ResourceLines)
        .render(&mut resolver, &project)
        .unwrap();
    assert!(rendered.is_none());
    assert_eq!(resolver.diagnostics().count(DiagnosticKind::NoResources), 1);
}

#[test]
fn chart_settings_deserialize_with_defaults() {
    let chart: Chart =
        serde_json::from_str(r#"{"scale": "week", "mode": "resource_lines", "time_unit_width": 25}"#)
            .unwrap();
    assert_eq!(chart.scale, Scale::Week);
    assert_eq!(chart.mode, RenderMode::ResourceLines);
    assert_eq!(chart.unit_width(), 10.0);
    assert!(chart.show_vacations);
    assert_eq!(chart.font_family, "Verdana");
    assert_eq!("macro".parse::<RenderMode>().unwrap(), RenderMode::MacroTasks);
}

fn connectors(group: &Group) -> Vec<Line> {
    group
        .leaves()
        .into_iter()
        .filter_map(|element| match element {
            Element::Line(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

fn assert_segment(line: &Line, from: (f64, f64), to: (f64, f64)) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(
        close(line.x1, from.0) && close(line.y1, from.1) && close(line.x2, to.0) && close(line.y2, to.1),
        "{line:?} is not {from:?} -> {to:?}"
    );
}

fn arrow_schedule() -> Schedule {
    let mut schedule = Schedule::new();
    schedule
        .add_task(Task::new("a").with_start(d(2024, 1, 1)).with_duration(3))
        .unwrap();
    schedule
        .add_task(Task::new("b").depends_on(["a"]).with_duration(2))
        .unwrap();
    schedule
        .add_task(Milestone::new("m").depends_on(["a"]))
        .unwrap();
    schedule
        .add_task(Task::new("c").depends_on(["m"]).with_duration(1))
        .unwrap();
    schedule
}

fn placed(layout: &mut LayoutTable, id: &str, x_begin: f64, x_end: f64, y: f64) {
    layout.insert(tid(id), Placement { x_begin, x_end, y });
}

#[test]
fn arrow_to_a_later_bar_has_two_segments() {
    let schedule = arrow_schedule();
    let mut layout = LayoutTable::new();
    placed(&mut layout, "a", 0.0, 3.0, 0.0);
    placed(&mut layout, "b", 3.0, 5.0, 1.0);
    let members = [tid("a"), tid("b")];

    let lines = connectors(&dependency_arrows(&schedule, &members, &layout, 0.0).unwrap());
    assert_eq!(lines.len(), 2);
    assert_segment(&lines[0], (2.8, 0.5), (3.0, 0.5));
    assert_segment(&lines[1], (3.0, 0.5), (3.0, 1.5));
    assert!(!lines[0].marker_end);
    assert!(lines[1].marker_end);

    // the label column shifts every point
    let shifted = connectors(&dependency_arrows(&schedule, &members, &layout, 4.0).unwrap());
    assert_segment(&shifted[0], (6.8, 0.5), (7.0, 0.5));
    assert_segment(&shifted[1], (7.0, 0.5), (7.0, 1.5));
}

#[test]
fn arrow_starting_right_of_target_detours() {
    let schedule = arrow_schedule();
    let mut layout = LayoutTable::new();
    // b drawn clipped, starting left of a's end
    placed(&mut layout, "a", 0.0, 3.0, 0.0);
    placed(&mut layout, "b", 1.0, 3.0, 2.0);

    let lines = connectors(
        &dependency_arrows(&schedule, &[tid("a"), tid("b")], &layout, 0.0).unwrap(),
    );
    assert_eq!(lines.len(), 4);
    assert_segment(&lines[0], (2.8, 0.5), (2.0, 0.5));
    assert_segment(&lines[1], (2.0, 0.5), (2.0, 1.5));
    assert_segment(&lines[2], (1.0, 1.5), (2.0, 1.5));
    assert_segment(&lines[3], (1.0, 1.5), (1.0, 2.5));
    assert!(lines[3].marker_end);
}

#[test]
fn arrow_from_milestone_leaves_past_the_diamond() {
    let schedule = arrow_schedule();
    let mut layout = LayoutTable::new();
    placed(&mut layout, "m", 3.0, 3.0, 1.0);
    placed(&mut layout, "c", 3.0, 4.0, 3.0);

    let lines = connectors(
        &dependency_arrows(&schedule, &[tid("m"), tid("c")], &layout, 1.0).unwrap(),
    );
    assert_eq!(lines.len(), 4);
    assert_segment(&lines[0], (4.9, 1.5), (5.0, 1.5));
    assert_segment(&lines[3], (4.0, 2.5), (4.0, 3.5));
}

#[test]
fn arrow_into_milestone_drops_on_its_center() {
    let schedule = arrow_schedule();
    let mut layout = LayoutTable::new();
    placed(&mut layout, "a", 0.0, 3.0, 0.0);
    placed(&mut layout, "m", 3.0, 3.0, 1.0);

    let lines = connectors(
        &dependency_arrows(&schedule, &[tid("a"), tid("m")], &layout, 0.0).unwrap(),
    );
    assert_eq!(lines.len(), 2);
    assert_segment(&lines[0], (2.8, 0.5), (3.5, 0.5));
    assert_segment(&lines[1], (3.5, 0.5), (3.5, 1.0));
}

#[test]
fn arrows_skip_items_outside_the_chart() {
    let schedule = arrow_schedule();
    let mut layout = LayoutTable::new();
    placed(&mut layout, "a", 0.0, 3.0, 0.0);
    placed(&mut layout, "b", 3.0, 5.0, 1.0);

    // a is drawn but not a member of this chart
    let group = dependency_arrows(&schedule, &[tid("b")], &layout, 0.0).unwrap();
    assert!(group.is_empty());
    // c's dependency m was never placed
    let group = dependency_arrows(&schedule, &[tid("m"), tid("c")], &layout, 0.0).unwrap();
    assert!(group.is_empty());
}
