//! Dependency graph report types.
//!
//! The graph itself is never stored — edges are materialized from each
//! active spec's `dependencies` set at validation time and discarded.

use serde::{Deserialize, Serialize};

/// A directed handoff edge, derived from `AgentSpec::dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The role declaring the dependency.
    pub caller: String,
    /// The role being handed off to.
    pub callee: String,
}

/// The result of a full dependency graph validation pass.
///
/// All failures are collected in one pass — a report never contains only
/// the first of several simultaneous problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    /// True only when `errors` is empty.
    pub is_healthy: bool,
    /// Every cycle, phantom dependency, and orphan found.
    pub errors: Vec<String>,
}

impl GraphReport {
    /// A healthy report with no errors.
    pub fn healthy() -> Self {
        Self { is_healthy: true, errors: Vec::new() }
    }

    /// Build a report from collected errors; healthy iff none.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { is_healthy: errors.is_empty(), errors }
    }
}
