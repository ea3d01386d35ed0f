//! Agent behavior specification ("DNA") types.
//!
//! An `AgentSpec` is the versioned behavioral definition of one agent:
//! purpose, ordered rule list, declared output schema, and the set of roles
//! it may hand off to. Specs are created by an administrative process,
//! mutated only through the mutation engine, and never deleted — an agent
//! is retired by flipping `is_active` off.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Minimum length of `AgentSpec::purpose`, in characters.
///
/// A purpose shorter than this is rejected at every store write — it is
/// too short to be a meaningful behavioral contract.
pub const MIN_PURPOSE_LEN: usize = 20;

/// The versioned behavior specification for one agent.
///
/// `role` is the unique key; the spec store enforces uniqueness. `version`
/// starts at 1 and is incremented by every committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique role key (e.g. "code_writer").
    pub role: String,

    /// Free-text statement of what this agent is for. Must be at least
    /// `MIN_PURPOSE_LEN` characters.
    pub purpose: String,

    /// Ordered sequence of natural-language behavioral constraints.
    pub rules: Vec<String>,

    /// JSON Schema document describing the agent's required output fields.
    ///
    /// `Value::Null` means "no structural constraint declared".
    pub output_schema: serde_json::Value,

    /// Roles this agent is permitted to hand off to.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,

    /// Monotonically increasing, starts at 1, bumped on every committed
    /// mutation. Never reused.
    pub version: u64,

    /// Inactive specs are excluded from the dependency graph and cannot be
    /// resolved by the pipeline engine.
    pub is_active: bool,

    /// Terminal agents produce final output and are exempt from the orphan
    /// check even when nothing references them.
    #[serde(default)]
    pub is_terminal: bool,
}

impl AgentSpec {
    /// Create a version-1, active spec with no rules or dependencies.
    pub fn new(role: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            purpose: purpose.into(),
            rules: Vec::new(),
            output_schema: serde_json::Value::Null,
            dependencies: BTreeSet::new(),
            version: 1,
            is_active: true,
            is_terminal: false,
        }
    }

    /// Structural self-check. Returns every violation, not just the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.role.trim().is_empty() {
            errors.push("role must be non-empty".to_string());
        }

        if self.purpose.chars().count() < MIN_PURPOSE_LEN {
            errors.push(format!(
                "purpose for role '{}' must be at least {} characters (got {})",
                self.role,
                MIN_PURPOSE_LEN,
                self.purpose.chars().count()
            ));
        }

        if self.version == 0 {
            errors.push(format!("version for role '{}' must start at 1", self.role));
        }

        errors
    }
}
