//! Action stack scenario runner.
//!
//! Single binary that provides:
//! - `ai-stack run` - simulate a humanoid against a scripted event scenario
//! - `ai-stack init` - write a scenario template

mod config;
mod world;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use ai_stack::humanoid::{humanoid_behavior, humanoid_registry};
use ai_stack::{Behavior, Brain, SharedTraceLog, TickContext};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ScenarioConfig, TEMPLATE};
use crate::world::DemoWorld;

const AGENT: u64 = 1;

#[derive(Parser)]
#[command(name = "ai-stack")]
#[command(about = "Interrupt-driven action stack scenario runner", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario file (YAML); built-in defaults when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the scenario's tick count
        #[arg(long)]
        ticks: Option<u64>,

        /// Print every trace event as a JSON line
        #[arg(long)]
        trace: bool,

        /// Print the final stack snapshot as JSON
        #[arg(long)]
        snapshot: bool,
    },

    /// Write a scenario template
    Init {
        #[arg(default_value = "scenario.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            trace,
            snapshot,
        } => {
            let mut config = ScenarioConfig::load_or_default(scenario.as_deref())?;
            if let Some(ticks) = ticks {
                config.ticks = ticks;
            }
            run_scenario(&config, trace, snapshot)
        }
        Commands::Init { path, force } => init_scenario(&path, force),
    }
}

fn run_scenario(config: &ScenarioConfig, trace: bool, snapshot: bool) -> Result<()> {
    tracing::info!(ticks = config.ticks, events = config.events.len(), "Starting scenario");

    let mut world = DemoWorld::new(config.move_ticks);
    let trace_log = SharedTraceLog::new();
    let mut behavior = humanoid_behavior(AGENT, Rc::new(humanoid_registry()))
        .with_config(config.behavior_config());
    if trace {
        behavior.set_trace_sink(Box::new(trace_log.clone()));
    }

    let mut brain = Brain::new(AGENT);
    brain.add_behavior(&TickContext::new(0, config.dt_seconds), &mut world, behavior);

    let mut ctx = TickContext::new(0, config.dt_seconds);
    brain.start_logic(&ctx, &mut world);
    let Some(started) = brain.behavior("humanoid") else {
        bail!("humanoid behavior was not added");
    };
    if !started.has_begun() {
        bail!("humanoid behavior failed to begin");
    }

    let mut last_shape = String::new();
    for _ in 0..config.ticks {
        ctx = ctx.next();

        for event in world.advance() {
            brain.send_event(&mut world, &event);
        }
        for scheduled in config.events_at(ctx.tick) {
            let event = scheduled.to_event();
            let receipts = brain.send_event(&mut world, &event);
            tracing::info!(tick = ctx.tick, event = event.name(), receipts = receipts.len(), "Delivered event");
        }

        brain.tick(&ctx, &mut world);

        let shape = brain.behavior("humanoid").map(describe).unwrap_or_default();
        if shape != last_shape {
            println!("tick {:>4}: {}", ctx.tick, shape);
            last_shape = shape;
        }
    }

    if snapshot {
        if let Some(behavior) = brain.behavior("humanoid") {
            let json = serde_json::to_string_pretty(&behavior.snapshot())
                .context("Failed to serialize snapshot")?;
            println!("{json}");
        }
    }

    brain.stop_logic(&ctx, &mut world);

    if trace {
        for event in &trace_log.log().events {
            let line = serde_json::to_string(event).context("Failed to serialize trace event")?;
            println!("{line}");
        }
    }

    tracing::info!(ticks = config.ticks, "Scenario finished");
    Ok(())
}

/// `idle > investigate [investigating (...)]`, root first; the top's label in brackets.
fn describe(behavior: &Behavior<DemoWorld>) -> String {
    let views = behavior.action_stack();
    if views.is_empty() {
        return "(empty)".to_string();
    }
    let mut line = views
        .iter()
        .map(|view| view.action.name())
        .collect::<Vec<_>>()
        .join(" > ");
    if let Some(label) = views.last().and_then(|top| top.label.as_ref()) {
        line.push_str(&format!(" [{label}]"));
    }
    line
}

fn init_scenario(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, TEMPLATE)
        .with_context(|| format!("Failed to write scenario to {}", path.display()))?;

    println!("Wrote scenario template to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the events list");
    println!("  2. Run: ai-stack run --scenario {}", path.display());

    Ok(())
}
