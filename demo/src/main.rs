//! REGENT Orchestration Core — Demo CLI
//!
//! Runs one or all of the demo scenarios. Each scenario uses real REGENT
//! components (graph validator, pipeline engine, mutation engine, spec
//! store) wired against in-process reference agents.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- graph
//!   cargo run -p demo -- pipeline
//!   cargo run -p demo -- rejection
//!   cargo run -p demo -- failure
//!   cargo run -p demo -- mutate

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod agents;
mod scenarios;

// ── CLI definition ────────────────────────────────────────────────────────────

/// REGENT — agent orchestration core demo.
///
/// Each subcommand exercises one slice of the core: graph certification,
/// pipeline execution with policy halts, and governed spec mutation.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "REGENT orchestration core demo",
    long_about = "Runs REGENT demo scenarios showing dependency graph certification,\n\
                  pipeline execution with telemetry and policy halts, and the\n\
                  propose/review/apply/rollback mutation lifecycle."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Validate a healthy and a deliberately broken dependency graph.
    Graph,
    /// Code pipeline happy path: writer → reviewer → approved.
    Pipeline,
    /// Quality gate rejection: the reviewer policy-halts the run.
    Rejection,
    /// Transport failure mid-pipeline with prior telemetry preserved.
    Failure,
    /// Full mutation round trip: propose, approve, apply, roll back.
    Mutate,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Graph => scenarios::run_graph_validation(),
        Command::Pipeline => scenarios::run_code_pipeline(),
        Command::Rejection => scenarios::run_gated_rejection(),
        Command::Failure => scenarios::run_transport_failure(),
        Command::Mutate => scenarios::run_mutation_round_trip(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> regent_contracts::error::RegentResult<()> {
    scenarios::run_graph_validation()?;
    scenarios::run_code_pipeline()?;
    scenarios::run_gated_rejection()?;
    scenarios::run_transport_failure()?;
    scenarios::run_mutation_round_trip()?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("REGENT — Agent Orchestration Core");
    println!("Reference Fleet Demo");
    println!("=================================");
    println!();
    println!("REGENT per-pipeline enforcement:");
    println!("  [1] Dependency graph certified: acyclic, no phantoms, no orphans");
    println!("  [2] Every adjacent handoff must be declared by the caller's spec");
    println!("  [3] Per step: transform input → resolve endpoint → invoke with timeout");
    println!("  [4] Reply verified against the role's declared output schema");
    println!("  [5] One telemetry row per attempted step, halts included");
    println!("  [6] Policy halts (rejection, low confidence) distinct from errors");
    println!();
}
