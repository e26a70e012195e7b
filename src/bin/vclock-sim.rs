//! Command-line driver for a vector clock session.
//!
//! ```text
//! vclock-sim --processes 3 local:1 send:1:2:hi recv:2
//! vclock-sim --scenario --json
//! ```
//!
//! Process ids on the command line are 1-based (`P1`..`PN`), matching the
//! labels in the rendered logs.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vclock_core::error::ClockError;
use vclock_core::node::NodeSnapshot;
use vclock_core::sim::{SimConfig, Simulation};
use vclock_core::types::{NodeId, NodeLabel};

#[derive(Parser, Debug)]
#[command(name = "vclock-sim", about = "Simulate vector clocks across N processes")]
struct Cli {
    /// Number of processes (at least 2).
    #[arg(short = 'n', long, default_value_t = 3)]
    processes: usize,

    /// JSON configuration file; overrides --processes.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Replay the three-process walkthrough before any STEP.
    #[arg(long)]
    scenario: bool,

    /// Print final snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Steps: `local:I`, `send:I:J:TEXT`, `recv:I` (1-based ids).
    #[arg(value_parser = parse_step)]
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
enum Step {
    Local(NodeId),
    Send(NodeId, NodeId, String),
    Recv(NodeId),
}

fn parse_id(raw: &str) -> Result<NodeId, String> {
    let id: usize = raw.parse().map_err(|_| format!("invalid process id '{}'", raw))?;
    id.checked_sub(1)
        .ok_or_else(|| "process ids start at 1".to_string())
}

fn parse_step(raw: &str) -> Result<Step, String> {
    let mut parts = raw.splitn(4, ':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("local"), Some(i), None, None) => Ok(Step::Local(parse_id(i)?)),
        (Some("recv"), Some(i), None, None) => Ok(Step::Recv(parse_id(i)?)),
        (Some("send"), Some(i), Some(j), Some(text)) => {
            Ok(Step::Send(parse_id(i)?, parse_id(j)?, text.to_string()))
        }
        _ => Err(format!(
            "invalid step '{}': expected local:I, send:I:J:TEXT or recv:I",
            raw
        )),
    }
}

fn scenario_steps() -> Vec<Step> {
    vec![
        Step::Local(0),
        Step::Send(0, 1, "hi".into()),
        Step::Recv(1),
        Step::Local(2),
        Step::Send(1, 2, "hey".into()),
        Step::Recv(2),
    ]
}

fn run_step(sim: &Simulation, step: &Step) -> Result<(), ClockError> {
    let update = match step {
        Step::Local(i) => sim.trigger_local_event(*i)?,
        Step::Send(i, j, text) => sim.trigger_send(*i, *j, text.as_str())?,
        Step::Recv(i) => match sim.poll_and_apply_receives(*i) {
            Ok(update) => update,
            Err(err) => {
                for event in &err.applied {
                    println!("{} {}", NodeLabel(*i), event);
                }
                if let Some(message) = &err.rejected {
                    eprintln!("{} dropped message from {}", NodeLabel(*i), NodeLabel(message.sender));
                }
                return Err(err.into());
            }
        },
    };
    for event in &update.new_events {
        println!("{} {}", NodeLabel(update.node), event);
    }
    Ok(())
}

fn print_text(snapshots: &[NodeSnapshot]) {
    for snap in snapshots {
        println!("{} VC={}", NodeLabel(snap.node), snap.clock);
        for event in &snap.log {
            println!("  {}", event);
        }
        for line in &snap.inbox {
            println!("  inbox {}", line);
        }
    }
}

fn load_config(cli: &Cli) -> Result<SimConfig, ClockError> {
    match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| ClockError::Config(format!("{}: {}", path.display(), e)))?;
            SimConfig::from_json_str(&json)
        }
        None => Ok(SimConfig::new(cli.processes)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sim = match load_config(&cli).and_then(Simulation::with_config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut steps = if cli.scenario { scenario_steps() } else { Vec::new() };
    steps.extend(cli.steps.iter().cloned());

    let mut failures = 0usize;
    for step in &steps {
        // A failed step is reported and the session carries on.
        if let Err(err) = run_step(&sim, step) {
            eprintln!("step {:?} failed: {}", step, err);
            failures += 1;
        }
    }

    let snapshots = sim.snapshots();
    if cli.json {
        match serde_json::to_string_pretty(&snapshots) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("error: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_text(&snapshots);
    }
    sim.shutdown();

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
