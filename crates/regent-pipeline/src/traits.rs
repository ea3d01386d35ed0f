//! Boundary trait definitions for the pipeline engine.
//!
//! Two traits define the engine's external collaborators:
//!
//! - `AgentInvoker` — the outbound agent call (an opaque synchronous RPC)
//! - `TelemetrySink` — the append-only per-step telemetry write
//!
//! The engine wires them together; implementations live outside the trusted
//! core (HTTP transport, relational sink) or in this crate as in-process
//! reference implementations for tests and the demo.

use std::time::Duration;

use regent_contracts::{
    error::RegentResult,
    pipeline::{AgentReply, StepTelemetry},
};

/// The capability interface for invoking one agent.
///
/// One concrete implementation exists per transport — HTTP, in-process,
/// test double — and the engine selects the callee via the endpoint
/// registry, never by branching on the role name.
///
/// `Err` means the call itself failed (connection, timeout enforcement,
/// protocol); `Ok` with `success = false` means the transport delivered a
/// reply in which the agent reported failure. The engine halts the run
/// with `HaltedError` in both cases.
pub trait AgentInvoker: Send + Sync {
    /// Invoke `role` with `input`, bounded by `timeout`.
    fn invoke(&self, role: &str, input: &serde_json::Value, timeout: Duration)
        -> RegentResult<AgentReply>;
}

/// Append-only sink for per-step telemetry rows.
///
/// Rows for a single trace id arrive in step-index order and must be stored
/// without reordering. Implementations must tolerate the nullable analytic
/// columns (`confidence`, `memory_used`, `retrieval_used`) being absent.
///
/// A failed write is logged by the engine and does NOT halt the pipeline.
pub trait TelemetrySink: Send + Sync {
    /// Persist one immutable telemetry row.
    fn record(&self, row: StepTelemetry) -> RegentResult<()>;
}
