//! Engine policy configuration, loadable from TOML.
//!
//! Everything tunable about the halting policy lives here so operators can
//! change it without a redeploy: the confidence floor, which roles count as
//! quality gates, how the low-confidence lookahead treats downstream steps,
//! the verdict field conventions, and the step timeout.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use regent_contracts::error::{RegentError, RegentResult};

use crate::handoff::HandoffDecl;

/// How the low-confidence halting rule inspects the remaining step list.
///
/// A step below the confidence floor is allowed to continue only when a
/// "review" step remains downstream. What counts as review is policy, not a
/// constant:
///
/// - `QualityGatesOnly` (default) — only designated quality-gate roles
///   excuse low confidence. A low-confidence draft may proceed into a
///   reviewer, but not into a mere formatting step.
/// - `AnyDownstreamStep` — any remaining step counts as review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewLookahead {
    QualityGatesOnly,
    AnyDownstreamStep,
}

/// Pipeline engine policy knobs.
///
/// Deserializable from TOML; `EngineConfig::default()` gives the built-in
/// policy used when no file is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Steps reporting confidence below this halt unless review remains.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Roles whose rejection verdict policy-halts the pipeline.
    #[serde(default)]
    pub quality_gate_roles: BTreeSet<String>,

    /// Output field inspected for the quality-gate verdict.
    #[serde(default = "default_verdict_field")]
    pub verdict_field: String,

    /// Verdict value that triggers a policy halt.
    #[serde(default = "default_rejection_value")]
    pub rejection_value: String,

    /// Lookahead semantics for the low-confidence rule.
    #[serde(default = "default_review_lookahead")]
    pub review_lookahead: ReviewLookahead,

    /// Bound on each outbound agent call, in seconds.
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,

    /// Declarative handoff transforms, keyed by role pair.
    #[serde(default)]
    pub handoffs: Vec<HandoffDecl>,
}

fn default_confidence_floor() -> f64 {
    0.6
}

fn default_verdict_field() -> String {
    "verdict".to_string()
}

fn default_rejection_value() -> String {
    "REJECT".to_string()
}

fn default_review_lookahead() -> ReviewLookahead {
    ReviewLookahead::QualityGatesOnly
}

fn default_step_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_floor: default_confidence_floor(),
            quality_gate_roles: BTreeSet::new(),
            verdict_field: default_verdict_field(),
            rejection_value: default_rejection_value(),
            review_lookahead: default_review_lookahead(),
            step_timeout_secs: default_step_timeout_secs(),
            handoffs: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse `s` as TOML engine configuration.
    pub fn from_toml_str(s: &str) -> RegentResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| RegentError::ConfigError {
            reason: format!("failed to parse engine config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML engine configuration.
    pub fn from_file(path: &Path) -> RegentResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RegentError::ConfigError {
            reason: format!("failed to read engine config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> RegentResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(RegentError::ConfigError {
                reason: format!(
                    "confidence_floor must be within [0.0, 1.0], got {}",
                    self.confidence_floor
                ),
            });
        }
        if self.step_timeout_secs == 0 {
            return Err(RegentError::ConfigError {
                reason: "step_timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// True when `role` is a designated quality gate.
    pub fn is_quality_gate(&self, role: &str) -> bool {
        self.quality_gate_roles.contains(role)
    }

    /// The per-step invocation bound as a `Duration`.
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// True when, under the configured lookahead, a review step remains in
    /// `remaining` (the declared steps after the current one).
    pub fn review_remains(&self, remaining: &[String]) -> bool {
        match self.review_lookahead {
            ReviewLookahead::AnyDownstreamStep => !remaining.is_empty(),
            ReviewLookahead::QualityGatesOnly => {
                remaining.iter().any(|role| self.is_quality_gate(role))
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
