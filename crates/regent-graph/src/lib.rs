//! # regent-graph
//!
//! Dependency graph validation for the REGENT orchestration core.
//!
//! Given the full set of agent specs, this crate materializes the directed
//! handoff graph (agent → declared dependency) and certifies that it is
//! safe to execute against: acyclic, free of phantom targets, free of
//! orphans. The validator is pure — both the pipeline engine and the
//! mutation engine call it before any state-changing operation.

pub mod validator;

pub use validator::{can_hand_off, edges, to_mermaid, validate};
