//! Error types for the REGENT orchestration core.
//!
//! All fallible operations across the workspace return `RegentResult<T>`.
//! Variants carry enough context to be surfaced to an operator verbatim.
//! Policy halts (quality-gate rejection, low confidence) are NOT errors —
//! they are terminal `RunStatus` values returned by the pipeline engine.

use thiserror::Error;

/// The unified error type for the REGENT runtime.
#[derive(Debug, Error)]
pub enum RegentError {
    /// One or more validation checks failed. All failures are collected —
    /// callers receive the full set, never just the first.
    #[error("validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    /// A role was referenced that does not exist as an active spec.
    #[error("no active spec for role '{role}'")]
    SpecNotFound { role: String },

    /// A spec document failed structural validation before a store write.
    #[error("malformed spec: {reason}")]
    MalformedSpec { reason: String },

    /// The referenced mutation proposal does not exist.
    #[error("proposal '{id}' not found")]
    ProposalNotFound { id: String },

    /// A proposal lifecycle operation was attempted from the wrong state.
    #[error("cannot {action} proposal in state '{from}'")]
    IllegalTransition { from: String, action: String },

    /// The proposal's confidence does not meet the floor its risk level requires.
    #[error("risk gate failed: {reason}")]
    RiskGateFailed { reason: String },

    /// The proposal's change content matched a denylisted pattern.
    #[error("change content matched denylisted pattern '{pattern}'")]
    DenylistMatch { pattern: String },

    /// The exclusive write lock could not be acquired within the retry budget.
    ///
    /// The proposal remains `Approved` and the apply may be retried.
    #[error("write lock contended after {attempts} attempts")]
    LockContention { attempts: u32 },

    /// The referenced snapshot does not exist.
    #[error("snapshot '{id}' not found")]
    SnapshotNotFound { id: String },

    /// The snapshot's stored content hash does not match its contents.
    ///
    /// Rolling back from a corrupt snapshot is refused unconditionally.
    #[error("snapshot '{id}' failed content hash verification")]
    SnapshotCorrupt { id: String },

    /// The spec store rejected a write.
    #[error("spec store write failed: {reason}")]
    StoreWriteFailed { reason: String },

    /// The telemetry sink rejected a row.
    ///
    /// The pipeline engine logs this and continues — a telemetry failure
    /// never halts a run.
    #[error("telemetry write failed: {reason}")]
    TelemetryWriteFailed { reason: String },

    /// The outbound agent call failed (transport, timeout, or non-success reply).
    #[error("invoking agent '{role}' failed: {reason}")]
    InvokeFailed { role: String, reason: String },

    /// A pipeline was submitted with an empty step list.
    #[error("pipeline step list is empty")]
    EmptyPipeline,

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the REGENT crates.
pub type RegentResult<T> = Result<T, RegentError>;
