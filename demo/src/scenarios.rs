//! Demo scenarios exercising the orchestration core end to end.
//!
//! Each scenario wires real components — spec store, graph validator,
//! pipeline engine, mutation engine — against the in-process reference
//! agents and prints what happened.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use regent_contracts::{
    error::RegentResult,
    mutation::{ChangeType, ReviewDecision, RiskLevel},
    pipeline::StepTelemetry,
    spec::AgentSpec,
};
use regent_mutation::{MutationConfig, MutationEngine, ProposalDraft};
use regent_pipeline::{
    AgentRegistry, EndpointStatus, InMemoryTelemetrySink, PipelineEngine,
};
use regent_store::{
    InMemoryProposalStore, InMemorySnapshotStore, InMemorySpecStore, InMemoryWriteLock,
    SnapshotStore, SpecStore,
};

use crate::agents::{engine_config, reference_invoker, registry, seed_specs};

// ── Wiring helpers ────────────────────────────────────────────────────────────

fn build_engine(registry: AgentRegistry) -> RegentResult<(PipelineEngine, Arc<Mutex<Vec<StepTelemetry>>>)> {
    let store = Arc::new(InMemorySpecStore::seeded(seed_specs())?);
    let sink = InMemoryTelemetrySink::new();
    let rows = sink.rows();
    let engine = PipelineEngine::new(
        store,
        Box::new(reference_invoker()),
        Box::new(sink),
        registry,
        engine_config(),
    );
    Ok((engine, rows))
}

fn print_telemetry(rows: &Arc<Mutex<Vec<StepTelemetry>>>) {
    println!("  telemetry:");
    for row in rows.lock().expect("telemetry rows").iter() {
        println!(
            "    step {} {:<14} success={:<5} confidence={} {}",
            row.step_index,
            row.role,
            row.success,
            row.confidence.map(|c| format!("{:.2}", c)).unwrap_or_else(|| "-".to_string()),
            row.error.as_deref().unwrap_or(""),
        );
    }
}

// ── Scenario 1: dependency graph validation ───────────────────────────────────

/// Validate the healthy reference graph, then a deliberately broken set,
/// showing that all violations are collected in one report.
pub fn run_graph_validation() -> RegentResult<()> {
    println!("── Scenario: dependency graph validation ──");

    let specs: BTreeMap<String, AgentSpec> =
        seed_specs().into_iter().map(|s| (s.role.clone(), s)).collect();

    let report = regent_graph::validate(&specs);
    println!("  healthy fleet: is_healthy={}", report.is_healthy);
    println!("{}", indent(&regent_graph::to_mermaid(&specs)));

    // Break the graph three ways at once.
    let mut broken = specs;
    broken.get_mut("code_reviewer").unwrap().dependencies.insert("code_writer".to_string());
    broken.get_mut("video_planner").unwrap().dependencies.insert("storyboarder".to_string());
    broken.insert(
        "drifter".to_string(),
        AgentSpec::new("drifter", "An agent that nothing references and that references nothing"),
    );

    let report = regent_graph::validate(&broken);
    println!("  broken fleet: is_healthy={}", report.is_healthy);
    for error in &report.errors {
        println!("    - {}", error);
    }
    println!();
    Ok(())
}

// ── Scenario 2: code pipeline, happy path ─────────────────────────────────────

/// The writer drafts code, the reviewer approves, the pipeline completes.
pub fn run_code_pipeline() -> RegentResult<()> {
    println!("── Scenario: code pipeline (approved) ──");

    let (engine, rows) = build_engine(registry())?;
    let outcome = engine.execute(
        vec!["code_writer".to_string(), "code_reviewer".to_string()],
        json!({"task": "write a hello world"}),
    )?;

    println!("  trace {}", outcome.trace_id);
    println!("  status: {:?}, steps completed: {}", outcome.status, outcome.steps_completed);
    println!("  final output: {}", outcome.results.last().unwrap_or(&serde_json::Value::Null));
    print_telemetry(&rows);
    println!();
    Ok(())
}

// ── Scenario 3: quality gate rejection ────────────────────────────────────────

/// The writer is pushed into unsafe code; the reviewer's rejection verdict
/// halts the pipeline as a policy decision, not an error.
pub fn run_gated_rejection() -> RegentResult<()> {
    println!("── Scenario: quality gate rejection ──");

    let (engine, rows) = build_engine(registry())?;
    let outcome = engine.execute(
        vec!["code_writer".to_string(), "code_reviewer".to_string()],
        json!({"task": "ship it at any cost"}),
    )?;

    println!("  status: {:?} (policy halt, both steps attempted)", outcome.status);
    println!("  halt reason: {}", outcome.halt_reason.as_deref().unwrap_or("-"));
    print_telemetry(&rows);
    println!();
    Ok(())
}

// ── Scenario 4: transport failure mid-pipeline ────────────────────────────────

/// The script writer's endpoint is in maintenance: step 1 succeeds and its
/// telemetry survives; step 2 fails as a transport error and halts the run.
pub fn run_transport_failure() -> RegentResult<()> {
    println!("── Scenario: transport failure mid-pipeline ──");

    let mut registry = registry();
    registry.set_status("script_writer", EndpointStatus::Maintenance);

    let (engine, rows) = build_engine(registry)?;
    let outcome = engine.execute(
        vec!["video_planner".to_string(), "script_writer".to_string()],
        json!({"topic": "why dependency graphs stay acyclic"}),
    )?;

    println!("  status: {:?}, steps completed: {}", outcome.status, outcome.steps_completed);
    println!("  halt reason: {}", outcome.halt_reason.as_deref().unwrap_or("-"));
    print_telemetry(&rows);
    println!();
    Ok(())
}

// ── Scenario 5: mutation round trip ───────────────────────────────────────────

/// Propose a rule addition, approve it, apply it (snapshotting v1), then
/// roll back and show the original rules restored under a fresh label.
pub fn run_mutation_round_trip() -> RegentResult<()> {
    println!("── Scenario: mutation round trip ──");

    let store = Arc::new(InMemorySpecStore::seeded(seed_specs())?);
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let proposals = Arc::new(InMemoryProposalStore::new());
    let lock = Arc::new(InMemoryWriteLock::new());
    let engine = MutationEngine::new(
        store.clone(),
        snapshots.clone(),
        proposals,
        lock,
        MutationConfig::default(),
    )?;

    let before = store.get("code_writer")?.expect("seeded spec");
    println!("  code_writer v{} rules: {:?}", before.version, before.rules);

    let proposal = engine.propose(ProposalDraft {
        target_role: "code_writer".to_string(),
        change_type: ChangeType::AddRule,
        change_content: "include type hints".to_string(),
        risk_level: RiskLevel::Low,
        confidence: 0.8,
        rollback_strategy: "remove the added rule via remove_rule".to_string(),
    })?;
    println!("  proposed {} ({:?})", proposal.id, proposal.status);

    let reviewed = engine.review(&proposal.id, ReviewDecision::Approve, "audit_minister")?;
    println!("  reviewed -> {:?}", reviewed.status);

    let receipt = engine.apply(&proposal.id)?;
    let after = store.get("code_writer")?.expect("seeded spec");
    println!(
        "  applied -> v{} rules: {:?} (snapshot {})",
        after.version, after.rules, receipt.snapshot_label
    );

    let rollback = engine.rollback(&receipt.snapshot_id, "operator")?;
    let restored = store.get("code_writer")?.expect("seeded spec");
    println!(
        "  rolled back to {} -> v{} rules: {:?}",
        rollback.restored_label, restored.version, restored.rules
    );

    let labels: Vec<String> = snapshots
        .list()?
        .into_iter()
        .map(|s| s.label)
        .collect();
    println!("  snapshot history: {:?} (labels never reused)", labels);
    println!();
    Ok(())
}

// ── Formatting ────────────────────────────────────────────────────────────────

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
