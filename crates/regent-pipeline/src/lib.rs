//! # regent-pipeline
//!
//! The sequential agent pipeline engine for the REGENT orchestration core.
//!
//! A pipeline is an ordered list of role invocations. The engine:
//!
//! - re-certifies the dependency graph (or reuses a store-version-fresh
//!   certification) and checks every adjacent handoff before the first call;
//! - applies a role-pair-keyed handoff transform to shape each step's input;
//! - resolves the role through the endpoint registry and invokes the agent
//!   transport with a bounded timeout;
//! - verifies the reply against the role's declared output schema;
//! - records exactly one telemetry row per attempted step, halts included;
//! - enforces the halting policy: transport failure → `HaltedError`;
//!   quality-gate rejection or unreviewed low confidence → `HaltedRejected`.
//!
//! Execution is strictly sequential and blocking — no step starts before the
//! previous step's telemetry is recorded.

pub mod config;
pub mod engine;
pub mod handoff;
pub mod invoker;
pub mod output;
pub mod registry;
pub mod telemetry;
pub mod traits;

pub use config::{EngineConfig, ReviewLookahead};
pub use engine::PipelineEngine;
pub use handoff::HandoffMap;
pub use invoker::InProcessInvoker;
pub use registry::{AgentEndpoint, AgentRegistry, EndpointStatus};
pub use telemetry::InMemoryTelemetrySink;
pub use traits::{AgentInvoker, TelemetrySink};
