use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use gantt_tool::persistence::{Plan, load_plan_from_json};
use gantt_tool::{Chart, RenderMode, Resolver, Scale, ScheduleItem};

/// Resolve, check and draw Gantt plans
#[derive(Parser)]
#[command(name = "gantt")]
#[command(about = "Resolve task dates of a plan and render them as SVG or CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the plan as an SVG chart
    Render {
        /// Plan file (JSON)
        plan: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Export resolved task dates as semicolon separated values
    Csv {
        /// Plan file (JSON)
        plan: PathBuf,

        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print resolved start and end dates as a table
    Dates {
        /// Plan file (JSON)
        plan: PathBuf,
    },
    /// Report dependency, overcharge and vacation conflicts
    Conflicts {
        /// Plan file (JSON)
        plan: PathBuf,
    },
}

#[derive(Args)]
struct ChartArgs {
    /// Chart settings (JSON); overrides the chart stored in the plan
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Time scale: day, week or month
    #[arg(long)]
    scale: Option<Scale>,

    /// tasks, macro_tasks, resource_lines or resource_tasks
    #[arg(long)]
    mode: Option<RenderMode>,

    /// First visible day (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last visible day (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Day marked as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Width of one time unit in cm
    #[arg(long)]
    unit_width: Option<f64>,
}

impl ChartArgs {
    fn resolve(&self, plan: &Plan) -> Result<Chart, Box<dyn Error>> {
        let mut chart = match &self.chart {
            Some(path) => serde_json::from_reader(io::BufReader::new(File::open(path)?))?,
            None => plan.chart.clone().unwrap_or_default(),
        };
        if let Some(scale) = self.scale {
            chart.scale = scale;
        }
        if let Some(mode) = self.mode {
            chart.mode = mode;
        }
        if self.start.is_some() {
            chart.window_start = self.start;
        }
        if self.end.is_some() {
            chart.window_end = self.end;
        }
        if self.today.is_some() {
            chart.today = self.today;
        }
        if let Some(width) = self.unit_width {
            chart.time_unit_width = width;
        }
        Ok(chart)
    }
}

fn table_line<'c>(cells: impl Iterator<Item = &'c str>, widths: &[usize]) -> String {
    let mut out = String::from("|");
    for (cell, w) in cells.zip(widths) {
        let pad = w.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad + 1));
        out.push('|');
    }
    out
}

fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&table_line(header.iter().copied(), &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&table_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn load(path: &Path) -> Result<Plan, Box<dyn Error>> {
    let plan = load_plan_from_json(path)?;
    log::info!(
        "loaded {} items and {} resources from {}",
        plan.schedule.len(),
        plan.schedule.resources().count(),
        path.display()
    );
    Ok(plan)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Render {
            plan,
            output,
            chart,
        } => {
            let plan = load(&plan)?;
            let chart = chart.resolve(&plan)?;
            let mut resolver = Resolver::new(&plan.calendar, &plan.schedule);
            let outcome = chart.render_to_file(&mut resolver, &plan.project, &output)?;
            if outcome.written {
                println!(
                    "{} ({:.1} x {:.1} cm)",
                    output.display(),
                    outcome.width_cm,
                    outcome.height_cm
                );
            } else {
                println!("nothing to draw");
            }
            for conflict in &outcome.vacation_conflicts {
                println!(
                    "vacation: {} on {} ({})",
                    conflict.resource, conflict.date, conflict.task
                );
            }
        }
        Commands::Csv { plan, output } => {
            let plan = load(&plan)?;
            let mut resolver = Resolver::new(&plan.calendar, &plan.schedule);
            match output {
                Some(path) => {
                    let mut file = File::create(&path)?;
                    let sink: &mut dyn Write = &mut file;
                    plan.project.to_csv(&mut resolver, Some(sink))?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut lock = stdout.lock();
                    let sink: &mut dyn Write = &mut lock;
                    plan.project.to_csv(&mut resolver, Some(sink))?;
                    lock.flush()?;
                }
            }
        }
        Commands::Dates { plan } => {
            let plan = load(&plan)?;
            let mut resolver = Resolver::new(&plan.calendar, &plan.schedule);
            let mut rows = Vec::new();
            for id in plan.project.tasks() {
                let item = plan.schedule.get(&id)?;
                let start = resolver.start_date(&id)?;
                let end = resolver.end_date(&id)?;
                rows.push(vec![
                    id.to_string(),
                    item.fullname().to_string(),
                    start.to_string(),
                    end.to_string(),
                    if item.is_milestone() { "milestone".into() } else { "task".into() },
                ]);
            }
            print!(
                "{}",
                render_table(&["id", "name", "start", "end", "kind"], &rows)
            );
        }
        Commands::Conflicts { plan } => {
            let plan = load(&plan)?;
            let mut resolver = Resolver::new(&plan.calendar, &plan.schedule);
            resolver.resolve_all()?;

            let mut found = 0usize;
            for conflict in plan.project.dependency_conflicts(&mut resolver)? {
                found += 1;
                println!(
                    "dependency: {} starts {} before {} ends {}",
                    conflict.task, conflict.start, conflict.dependency, conflict.dependency_end
                );
            }
            for resource in plan.project.resources(&plan.schedule)? {
                for (day, tasks) in resolver.resource_conflicts(&resource, false)? {
                    found += 1;
                    println!("overcharge: {resource} on {day}: {}", tasks.join(", "));
                }
            }
            for id in plan.project.tasks() {
                for conflict in resolver.vacation_conflicts(&id)? {
                    found += 1;
                    println!(
                        "vacation: {} on {} ({})",
                        conflict.resource, conflict.date, conflict.task
                    );
                }
            }
            if found == 0 {
                println!("no conflicts");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
