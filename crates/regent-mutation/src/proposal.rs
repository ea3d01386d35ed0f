//! Proposal drafts and their shape validation.
//!
//! A `ProposalDraft` is what an analysis step (or operator) submits; the
//! engine validates it against the current spec set and the denylist
//! before a `MutationProposal` row is created. All violations are
//! collected into one error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use regent_contracts::{
    error::{RegentError, RegentResult},
    mutation::{ChangeType, RiskLevel},
    spec::AgentSpec,
};

use crate::denylist::Denylist;

/// Bounds on `change_content`, in characters.
pub const MIN_CHANGE_CONTENT_LEN: usize = 5;
pub const MAX_CHANGE_CONTENT_LEN: usize = 500;

/// Minimum length of the free-text rollback strategy.
pub const MIN_ROLLBACK_STRATEGY_LEN: usize = 10;

/// The caller-supplied input to `MutationEngine::propose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub target_role: String,
    pub change_type: ChangeType,
    pub change_content: String,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub rollback_strategy: String,
}

/// Validate a draft against the current spec set.
///
/// Checks, all collected: the target role exists and is active; content
/// and rollback-strategy length bounds; confidence range; the
/// risk/confidence alignment table; the denylist scan.
pub fn validate_draft(
    draft: &ProposalDraft,
    specs: &BTreeMap<String, AgentSpec>,
    denylist: &Denylist,
) -> RegentResult<()> {
    let mut errors = Vec::new();

    match specs.get(&draft.target_role) {
        Some(spec) if spec.is_active => {}
        Some(_) => errors.push(format!("target role '{}' is inactive", draft.target_role)),
        None => errors.push(format!("target role '{}' does not exist", draft.target_role)),
    }

    let content_len = draft.change_content.chars().count();
    if !(MIN_CHANGE_CONTENT_LEN..=MAX_CHANGE_CONTENT_LEN).contains(&content_len) {
        errors.push(format!(
            "change content must be {}-{} characters (got {})",
            MIN_CHANGE_CONTENT_LEN, MAX_CHANGE_CONTENT_LEN, content_len
        ));
    }

    if draft.rollback_strategy.chars().count() < MIN_ROLLBACK_STRATEGY_LEN {
        errors.push(format!(
            "rollback strategy must be at least {} characters",
            MIN_ROLLBACK_STRATEGY_LEN
        ));
    }

    if !(0.0..=1.0).contains(&draft.confidence) {
        errors.push(format!("confidence must be within [0.0, 1.0], got {}", draft.confidence));
    }

    if let Some(min) = draft.risk_level.min_confidence() {
        if draft.confidence < min {
            errors.push(format!(
                "{:?} risk proposals require confidence >= {:.2} (got {:.2})",
                draft.risk_level, min, draft.confidence
            ));
        }
    }

    if let Some(pattern) = denylist.scan(&draft.change_content) {
        errors.push(format!("change content matches denylisted pattern '{}'", pattern));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegentError::Validation { errors })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
