//! Mutation proposal and snapshot types.
//!
//! A mutation is a single-rule change to one agent's spec, carried through
//! a proposal → review → apply lifecycle. Only rule addition and removal
//! are supported — no in-place modification — which keeps rollback a pure
//! document restore.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::spec::AgentSpec;

/// Unique identifier for a mutation proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub uuid::Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a spec version snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub uuid::Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The kinds of rule change a proposal may carry.
///
/// In-place modification is deliberately absent: expressing an edit as a
/// remove + add pair keeps every snapshot a trivial restore target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Append `change_content` to the target spec's rules.
    AddRule,
    /// Remove the rule exactly matching `change_content`.
    RemoveRule,
}

/// Operator-assessed risk of a proposed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// The minimum confidence this risk level demands, if any.
    ///
    /// Low and medium risk accept any confidence; high requires 0.75,
    /// critical requires 0.90.
    pub fn min_confidence(&self) -> Option<f64> {
        match self {
            RiskLevel::Low | RiskLevel::Medium => None,
            RiskLevel::High => Some(0.75),
            RiskLevel::Critical => Some(0.90),
        }
    }
}

/// Lifecycle states of a mutation proposal.
///
/// Transitions only move forward: `Pending → Approved | Rejected`,
/// `Approved → Applied`, `Applied → RolledBack`. `Rejected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
    RolledBack,
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Applied => "applied",
            ProposalStatus::RolledBack => "rolled_back",
        };
        f.write_str(s)
    }
}

/// The reviewer's verdict on a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// A proposed change to one agent's rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationProposal {
    /// Generated identifier.
    pub id: ProposalId,
    /// The role whose spec this proposal targets.
    pub target_role: String,
    /// Whether the rule is added or removed.
    pub change_type: ChangeType,
    /// The rule text being added or removed.
    pub change_content: String,
    /// Operator-assessed risk of the change.
    pub risk_level: RiskLevel,
    /// Confidence in [0.0, 1.0] that the change is correct.
    pub confidence: f64,
    /// Free-text description of how to undo this change by hand.
    pub rollback_strategy: String,
    /// Current lifecycle state.
    pub status: ProposalStatus,
    /// Who reviewed the proposal, once reviewed.
    pub reviewed_by: Option<String>,
    /// When the proposal was created (UTC).
    pub created_at: DateTime<Utc>,
    /// When the proposal was applied, once applied (UTC).
    pub applied_at: Option<DateTime<Utc>>,
}

/// A full serialized copy of the spec store at one moment in time.
///
/// Taken immediately before every mutation is applied (and before every
/// rollback restores). Append-only; the sole mechanism for rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecVersionSnapshot {
    /// Generated identifier.
    pub snapshot_id: SnapshotId,
    /// Monotonic human-readable tag, e.g. "v7". Never reused.
    pub label: String,
    /// The complete spec document at snapshot time, keyed by role.
    pub specs: BTreeMap<String, AgentSpec>,
    /// The proposal that caused this snapshot, if any.
    pub proposal_id: Option<ProposalId>,
    /// Who triggered the write (reviewer or operator).
    pub taken_by: String,
    /// When the snapshot was taken (UTC).
    pub taken_at: DateTime<Utc>,
    /// SHA-256 hex of the canonical JSON of `specs`, verified before any
    /// rollback restores from this snapshot.
    pub content_hash: String,
}

/// Returned by a successful apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReceipt {
    /// The target spec's version after the mutation.
    pub new_version: u64,
    /// The pre-change snapshot written during the apply.
    pub snapshot_id: SnapshotId,
    /// The snapshot's monotonic label.
    pub snapshot_label: String,
}

/// Returned by a successful rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackReceipt {
    /// Label of the snapshot whose contents were restored.
    pub restored_label: String,
    /// The store-wide version counter after the restore.
    pub store_version: u64,
}
