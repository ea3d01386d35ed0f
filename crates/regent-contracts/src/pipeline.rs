//! Pipeline run, telemetry, and agent reply types.
//!
//! A pipeline is an ordered list of role invocations executed strictly left
//! to right. Each attempted step — including the one that triggers a halt —
//! produces exactly one immutable `StepTelemetry` row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque unique token identifying one pipeline invocation.
///
/// Caller-supplied or generated at invocation start. Telemetry rows for a
/// single trace id are totally ordered by step index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(pub uuid::Uuid);

impl TraceId {
    /// Create a new, unique trace ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal and non-terminal states of a pipeline run.
///
/// `HaltedRejected` is a policy decision (quality-gate rejection or
/// unreviewed low confidence), distinct from `HaltedError` which records an
/// execution failure. The two must never be conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Steps are still executing.
    Running,
    /// Every declared step executed successfully.
    Completed,
    /// A step's agent call failed (transport, timeout, malformed reply).
    HaltedError,
    /// A policy halt: validation failure, rejection verdict, or low
    /// confidence with no review remaining.
    HaltedRejected,
}

/// One pipeline invocation, owned exclusively by the call that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique token for this invocation.
    pub trace_id: TraceId,
    /// Ordered role names to execute.
    pub steps: Vec<String>,
    /// The structured document handed to the first step.
    pub initial_payload: serde_json::Value,
    /// Current state; terminal on completion or halt.
    pub status: RunStatus,
    /// Wall-clock start (UTC).
    pub started_at: DateTime<Utc>,
}

/// One immutable telemetry row per attempted pipeline step.
///
/// Written after every step regardless of outcome, before the halt decision
/// propagates. Never updated or deleted. The optional analytic columns
/// (`memory_used`, `retrieval_used`) are populated by richer transports and
/// tolerated as null by the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTelemetry {
    /// The run this row belongs to.
    pub trace_id: TraceId,
    /// Zero-based position in the declared step list.
    pub step_index: usize,
    /// The role that was invoked.
    pub role: String,
    /// The (transformed) input handed to the agent.
    pub input: serde_json::Value,
    /// The agent's output, if any was produced.
    pub output: Option<serde_json::Value>,
    /// False when the agent call failed or its reply was malformed.
    pub success: bool,
    /// The agent's self-reported confidence, when present.
    pub confidence: Option<f64>,
    /// Failure detail when `success` is false.
    pub error: Option<String>,
    /// Step wall-clock duration in milliseconds.
    pub duration_ms: i64,
    /// Whether the transport enriched the call with long-term memory.
    pub memory_used: Option<bool>,
    /// Whether the transport enriched the call with retrieval context.
    pub retrieval_used: Option<bool>,
    /// When this row was recorded (UTC).
    pub recorded_at: DateTime<Utc>,
}

/// What the outbound agent-call collaborator returns for one invocation.
///
/// The orchestration core treats the call as an opaque synchronous RPC:
/// it inspects only these fields, never the transport beneath them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// The agent's structured output document.
    pub output: serde_json::Value,
    /// False when the agent itself reported failure.
    pub success: bool,
    /// Self-reported confidence in [0.0, 1.0], when the agent provides one.
    pub confidence: Option<f64>,
    /// Failure detail when `success` is false.
    pub error: Option<String>,
}

impl AgentReply {
    /// A successful reply with the given output and confidence.
    pub fn ok(output: serde_json::Value, confidence: f64) -> Self {
        Self { output, success: true, confidence: Some(confidence), error: None }
    }

    /// A failed reply carrying an error description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            output: serde_json::Value::Null,
            success: false,
            confidence: None,
            error: Some(error.into()),
        }
    }
}

/// The final result of a pipeline execution returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// The run's trace id (generated if the caller supplied none).
    pub trace_id: TraceId,
    /// Terminal status of the run.
    pub status: RunStatus,
    /// Ordered outputs of every step that produced one.
    pub results: Vec<serde_json::Value>,
    /// How many steps ran to a successful conclusion.
    pub steps_completed: usize,
    /// Why the run halted, when it did not complete.
    pub halt_reason: Option<String>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: i64,
}
