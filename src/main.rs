use clap::{Parser, ValueEnum};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};
use tailplan::assign::result::{AssignmentResult, RejectionReason};
use tailplan::config::SolvePreset;
use tailplan::engine::{self, Method};
use tailplan::exact::{SolvePhase, TailModel};
use tailplan::flight::Flight;
use tailplan::logging;
use tailplan::scenario::Scenario;

const PAGE_ROWS: usize = 20;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json")]
    scenario: PathBuf,

    /// Method of the initial run
    #[arg(short, long, value_enum, default_value_t = Method::Minimize)]
    method: Method,

    /// Time limit and gap for the exact method
    #[arg(short, long, value_enum, default_value_t = SolvePreset::Balanced)]
    preset: SolvePreset,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let Ok(mut pager) = pager else {
        println!("{}", content);
        return;
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_table<T: Tabled>(rows: &[T], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Alignment::left());
    if rows.len() > PAGE_ROWS {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn hours(minutes: i64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[derive(Tabled)]
struct LegRow {
    #[tabled(rename = "Leg")]
    leg: Arc<str>,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "Type")]
    aircraft_type: Arc<str>,
    #[tabled(rename = "Tail")]
    tail: String,
}

impl LegRow {
    fn new(flight: &Flight, result: &AssignmentResult) -> LegRow {
        let tail = match result.assignments.get(&flight.id) {
            Some(tail) if flight.pinned_aircraft_id.is_some() => format!("{} (pinned)", tail).cyan().to_string(),
            Some(tail) => tail.to_string().green().to_string(),
            None => "overflow".red().to_string(),
        };
        LegRow {
            leg: flight.id.clone(),
            route: flight.route(),
            departure: flight.departure_time().to_string(),
            arrival: flight.arrival_time().to_string(),
            aircraft_type: flight.aircraft_type.clone(),
            tail,
        }
    }
}

#[derive(Tabled)]
struct TailRow {
    #[tabled(rename = "Tail")]
    tail: Arc<str>,
    #[tabled(rename = "Type")]
    aircraft_type: Arc<str>,
    #[tabled(rename = "Legs")]
    legs: usize,
    #[tabled(rename = "Block hours")]
    block_hours: String,
    #[tabled(rename = "Chain breaks")]
    chain_breaks: usize,
}

#[derive(Tabled)]
struct BreakRow {
    #[tabled(rename = "Tail")]
    tail: Arc<str>,
    #[tabled(rename = "Arriving")]
    arriving: Arc<str>,
    #[tabled(rename = "At")]
    arrival_station: Arc<str>,
    #[tabled(rename = "Departing")]
    departing: Arc<str>,
    #[tabled(rename = "From")]
    departure_station: Arc<str>,
}

#[derive(Tabled)]
struct ReasonRow {
    #[tabled(rename = "Tail")]
    tail: Arc<str>,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn describe(reason: &RejectionReason) -> String {
    match reason {
        RejectionReason::Overlap { conflicting_leg } => format!("turnaround conflict with {}", conflicting_leg),
        RejectionReason::HardRule { rule_ids } => format!("hard rule {}", rule_ids.join(", ")),
        RejectionReason::Score => "ranked lower".to_string(),
    }
}

fn print_summary(result: &AssignmentResult) {
    let summary = &result.summary;
    println!("\nMethod:              {}", result.method);
    if let Some(status) = &result.solver_status {
        println!("Solver status:       {:?}", status);
    }
    println!("Legs:                {}", summary.total);
    println!("Assigned:            {}", summary.assigned.to_string().green());
    let overflowed = summary.overflowed.to_string();
    if summary.overflowed > 0 {
        println!("Overflow:            {}", overflowed.red());
    } else {
        println!("Overflow:            {}", overflowed);
    }
    println!("Chain breaks:        {}", result.chain_breaks.len());
    println!("Hard violations:     {}", summary.hard_rule_violations);
    println!("Soft violations:     {}", summary.soft_rule_violations);
    println!("Total penalty:       {}\n", summary.total_penalty);
}

fn report_phase(phase: SolvePhase) {
    let label = match phase {
        SolvePhase::Building => "building model",
        SolvePhase::Solving => "solving",
        SolvePhase::Extracting => "extracting solution",
    };
    println!("{} {}", "..".dimmed(), label);
}

async fn run(scenario: &Scenario, method: Method, preset: SolvePreset) -> Option<AssignmentResult> {
    match engine::run(scenario, method, preset, &report_phase).await {
        Ok(result) => {
            print_summary(&result);
            Some(result)
        }
        Err(e) => {
            println!("{} {}", "Run failed:".red(), e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let scenario = Scenario::load_from_file(&args.scenario)?;
    println!(
        "Loaded {} legs and {} tails from {}",
        scenario.flights.len(),
        scenario.aircraft.len(),
        args.scenario.display()
    );

    let mut method = args.method;
    let mut preset = args.preset;
    let mut result = run(&scenario, method, preset).await;

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "run".to_string(),
            "ls".to_string(),
            "tails".to_string(),
            "stations".to_string(),
            "why".to_string(),
            "breaks".to_string(),
            "summary".to_string(),
            "model".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "run" => {
                        for arg in &parts[1..] {
                            if let Ok(m) = Method::from_str(arg, true) {
                                method = m;
                            } else if let Ok(p) = SolvePreset::from_str(arg, true) {
                                preset = p;
                            } else {
                                println!("Ignoring unknown run argument: {}", arg);
                            }
                        }
                        result = run(&scenario, method, preset).await;
                    }
                    "model" => {
                        let Some(path) = parts.get(1) else {
                            println!("Usage: model <file>");
                            continue;
                        };
                        match TailModel::build(&scenario) {
                            Ok(model) => match std::fs::write(path, model.lp().to_lp_string()) {
                                Ok(()) => println!(
                                    "Wrote {} variables and {} constraints to {}",
                                    model.lp().variable_count(),
                                    model.lp().constraints().len(),
                                    path
                                ),
                                Err(e) => println!("{} {}", "Cannot write model:".red(), e),
                            },
                            Err(e) => println!("{} {}", "Cannot build model:".red(), e),
                        }
                    }
                    "stations" => print_table(&scenario.stations.airports(), "No stations in the scenario."),
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  run [method] [preset] - Re-run assignment; methods: minimize, balance, exact; presets: fast, balanced, thorough");
                        println!("  ls [filter]           - List legs, filter: a - assigned, o - overflow");
                        println!("  tails                 - Per-tail utilisation");
                        println!("  stations              - Known stations and their countries");
                        println!("  why <leg>             - Explain the placement of <leg>");
                        println!("  breaks                - List chain breaks");
                        println!("  summary               - Show counters of the last run");
                        println!("  model <file>          - Write the exact model in LP format to <file>");
                        println!("  help / ?              - Show this help menu");
                        println!("  exit / quit           - Exit\n");
                    }
                    "exit" | "quit" => break,
                    command => {
                        let Some(result) = &result else {
                            println!("No assignment available, use 'run' first.");
                            continue;
                        };
                        handle_report(command, &parts[1..], &scenario, result);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn handle_report(command: &str, args: &[&str], scenario: &Scenario, result: &AssignmentResult) {
    match command {
        "ls" => {
            let sub = args.first().copied().unwrap_or("all");
            let rows: Vec<LegRow> = scenario
                .flights
                .iter()
                .filter(|f| match sub {
                    "a" | "assigned" => result.assignments.contains_key(&f.id),
                    "o" | "overflow" => !result.assignments.contains_key(&f.id),
                    _ => true,
                })
                .map(|f| LegRow::new(f, result))
                .collect();
            print_table(&rows, "No matching legs found.");
        }
        "tails" => {
            let rows: Vec<TailRow> = scenario
                .aircraft
                .iter()
                .map(|a| {
                    let legs: Vec<&Flight> = scenario
                        .flights
                        .iter()
                        .filter(|f| result.assignments.get(&f.id) == Some(&a.id))
                        .collect();
                    TailRow {
                        tail: a.id.clone(),
                        aircraft_type: a.aircraft_type.clone(),
                        legs: legs.len(),
                        block_hours: hours(legs.iter().map(|f| f.duration()).sum()),
                        chain_breaks: result.chain_breaks.iter().filter(|b| b.aircraft_id == a.id).count(),
                    }
                })
                .collect();
            print_table(&rows, "No tails in the scenario.");
        }
        "why" => {
            let Some(leg) = args.first() else {
                println!("Usage: why <leg>");
                return;
            };
            let leg: Arc<str> = Arc::from(*leg);
            let Some(flight) = scenario.flights.iter().find(|f| f.id == leg) else {
                println!("Unknown leg: {}", leg);
                return;
            };
            match result.assignments.get(&leg) {
                Some(tail) => println!("{} flies on {}", flight.id, tail.to_string().green()),
                None => println!("{} is in {}", flight.id, "overflow".red()),
            }
            for violation in result.violations.get(&leg).into_iter().flatten() {
                println!(
                    "  violates {} ({:?}, penalty {})",
                    violation.rule_name, violation.enforcement, violation.penalty
                );
            }
            let rows: Vec<ReasonRow> = result
                .rejections
                .get(&leg)
                .into_iter()
                .flatten()
                .map(|r| ReasonRow {
                    tail: r.aircraft_id.clone(),
                    reason: describe(&r.reason),
                })
                .collect();
            print_table(&rows, "No tail was turned down.");
        }
        "breaks" => {
            let rows: Vec<BreakRow> = result
                .chain_breaks
                .iter()
                .map(|b| BreakRow {
                    tail: b.aircraft_id.clone(),
                    arriving: b.arriving_leg.clone(),
                    arrival_station: b.arrival_station.clone(),
                    departing: b.departing_leg.clone(),
                    departure_station: b.departure_station.clone(),
                })
                .collect();
            print_table(&rows, "No chain breaks.");
        }
        "summary" => print_summary(result),
        _ => println!("Unknown command: {}", command),
    }
}
