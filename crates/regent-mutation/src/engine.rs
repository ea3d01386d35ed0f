//! The mutation engine: proposal lifecycle and gated apply/rollback.
//!
//! The lifecycle is forward-only:
//!
//!   pending --review(approve)--> approved --apply--> applied --rollback--> rolled_back
//!   pending --review(reject)---> rejected (terminal)
//!
//! `apply` runs its gates in a fixed order — risk/confidence table,
//! denylist scan, dependency graph re-validation — and only then takes the
//! cross-process write lock, snapshots the pre-change state, and commits
//! the mutated document as a single atomic replace. A failure at any gate
//! leaves the store untouched and the proposal `Approved`, eligible for
//! retry.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use regent_contracts::{
    error::{RegentError, RegentResult},
    mutation::{
        ApplyReceipt, ChangeType, MutationProposal, ProposalId, ProposalStatus, ReviewDecision,
        RollbackReceipt, SnapshotId,
    },
    spec::AgentSpec,
};
use regent_store::{
    acquire_with_retry, build_snapshot, verify_snapshot, ProposalStore, SnapshotStore, SpecStore,
    WriteLock,
};

use crate::{
    denylist::{Denylist, DEFAULT_PATTERNS},
    proposal::{validate_draft, ProposalDraft},
};

/// Mutation engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// How many times to try the write lock before giving up.
    #[serde(default = "default_max_lock_attempts")]
    pub max_lock_attempts: u32,

    /// Base backoff between lock attempts, in milliseconds (linear).
    #[serde(default = "default_lock_backoff_ms")]
    pub lock_backoff_ms: u64,

    /// Denylist patterns applied to change content. Defaults to the
    /// built-in set.
    #[serde(default = "default_denylist_patterns")]
    pub denylist_patterns: Vec<String>,
}

fn default_max_lock_attempts() -> u32 {
    5
}

fn default_lock_backoff_ms() -> u64 {
    50
}

fn default_denylist_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            max_lock_attempts: default_max_lock_attempts(),
            lock_backoff_ms: default_lock_backoff_ms(),
            denylist_patterns: default_denylist_patterns(),
        }
    }
}

/// The mutation engine.
///
/// Owns no state of its own — everything lives in the injected stores, so
/// multiple service replicas can each construct an engine over the same
/// shared persistence and race safely on the advisory lock.
pub struct MutationEngine {
    store: Arc<dyn SpecStore>,
    snapshots: Arc<dyn SnapshotStore>,
    proposals: Arc<dyn ProposalStore>,
    lock: Arc<dyn WriteLock>,
    denylist: Denylist,
    config: MutationConfig,
}

impl MutationEngine {
    /// Create an engine over the given persistence collaborators.
    ///
    /// Fails with `ConfigError` if a configured denylist pattern does not
    /// compile.
    pub fn new(
        store: Arc<dyn SpecStore>,
        snapshots: Arc<dyn SnapshotStore>,
        proposals: Arc<dyn ProposalStore>,
        lock: Arc<dyn WriteLock>,
        config: MutationConfig,
    ) -> RegentResult<Self> {
        let denylist = Denylist::from_patterns(&config.denylist_patterns)?;
        Ok(Self { store, snapshots, proposals, lock, denylist, config })
    }

    /// Validate `draft` and create a `pending` proposal.
    ///
    /// The system must be healthy before any mutation enters the queue:
    /// the dependency graph is validated here in addition to the draft's
    /// own shape checks.
    pub fn propose(&self, draft: ProposalDraft) -> RegentResult<MutationProposal> {
        let specs = self.store.load_all()?;

        let report = regent_graph::validate(&specs);
        if !report.is_healthy {
            return Err(RegentError::Validation { errors: report.errors });
        }

        validate_draft(&draft, &specs, &self.denylist)?;

        let proposal = MutationProposal {
            id: ProposalId::new(),
            target_role: draft.target_role,
            change_type: draft.change_type,
            change_content: draft.change_content,
            risk_level: draft.risk_level,
            confidence: draft.confidence,
            rollback_strategy: draft.rollback_strategy,
            status: ProposalStatus::Pending,
            reviewed_by: None,
            created_at: Utc::now(),
            applied_at: None,
        };

        info!(
            proposal_id = %proposal.id,
            target_role = %proposal.target_role,
            risk = ?proposal.risk_level,
            "proposal created"
        );
        self.proposals.insert(proposal.clone())?;
        Ok(proposal)
    }

    /// Review a `pending` proposal, moving it to `approved` or `rejected`.
    pub fn review(
        &self,
        id: &ProposalId,
        decision: ReviewDecision,
        reviewer: &str,
    ) -> RegentResult<MutationProposal> {
        let mut proposal = self.fetch(id)?;

        if proposal.status != ProposalStatus::Pending {
            return Err(RegentError::IllegalTransition {
                from: proposal.status.to_string(),
                action: "review".to_string(),
            });
        }

        proposal.status = match decision {
            ReviewDecision::Approve => ProposalStatus::Approved,
            ReviewDecision::Reject => ProposalStatus::Rejected,
        };
        proposal.reviewed_by = Some(reviewer.to_string());

        info!(
            proposal_id = %proposal.id,
            status = %proposal.status,
            reviewer = %reviewer,
            "proposal reviewed"
        );
        self.proposals.update(proposal.clone())?;
        Ok(proposal)
    }

    /// Apply an `approved` proposal.
    ///
    /// Gate order: (1) risk/confidence alignment, (2) denylist scan,
    /// (3) dependency graph over the post-change spec set, (4) write lock
    /// with bounded retries, (5) pre-change snapshot, (6) atomic document
    /// replace with the target spec's version bumped, (7) lock release
    /// (store version bump invalidates reader caches lazily), (8) proposal
    /// marked `applied`.
    pub fn apply(&self, id: &ProposalId) -> RegentResult<ApplyReceipt> {
        let mut proposal = self.fetch(id)?;

        if proposal.status != ProposalStatus::Approved {
            return Err(RegentError::IllegalTransition {
                from: proposal.status.to_string(),
                action: "apply".to_string(),
            });
        }

        // ── Gate 1: risk/confidence alignment ────────────────────────────────
        if let Some(min) = proposal.risk_level.min_confidence() {
            if proposal.confidence < min {
                warn!(proposal_id = %proposal.id, "apply refused by risk gate");
                return Err(RegentError::RiskGateFailed {
                    reason: format!(
                        "{:?} risk requires confidence >= {:.2}, proposal has {:.2}",
                        proposal.risk_level, min, proposal.confidence
                    ),
                });
            }
        }

        // ── Gate 2: denylist scan, independent of risk level ─────────────────
        if let Some(pattern) = self.denylist.scan(&proposal.change_content) {
            warn!(proposal_id = %proposal.id, pattern = %pattern, "apply refused by denylist");
            return Err(RegentError::DenylistMatch { pattern: pattern.to_string() });
        }

        // ── Gate 3: dependency graph over the post-change document ───────────
        //
        // Rule changes cannot reshape the graph, so validating against a
        // lock-free read is sound: any concurrent apply also only touches
        // rules.
        let current = self.store.load_all()?;
        let mutated = apply_change(&current, &proposal)?;
        let report = regent_graph::validate(&mutated);
        if !report.is_healthy {
            return Err(RegentError::Validation { errors: report.errors });
        }

        // ── Steps 4-7: lock, snapshot, atomic replace ────────────────────────
        let guard = acquire_with_retry(
            self.lock.as_ref(),
            self.config.max_lock_attempts,
            Duration::from_millis(self.config.lock_backoff_ms),
        )?;

        // Re-load under the lock: the authoritative pre-change state.
        let current = self.store.load_all()?;
        let mutated = apply_change(&current, &proposal)?;
        let new_version = mutated[&proposal.target_role].version;

        let label = self.snapshots.next_label()?;
        let taken_by = proposal.reviewed_by.clone().unwrap_or_else(|| "system".to_string());
        let snapshot = build_snapshot(current, label.clone(), Some(proposal.id), taken_by);
        let snapshot_id = snapshot.snapshot_id;
        self.snapshots.append(snapshot)?;

        self.store.replace_all(mutated)?;
        drop(guard);

        // ── Step 8: mark applied ─────────────────────────────────────────────
        proposal.status = ProposalStatus::Applied;
        proposal.applied_at = Some(Utc::now());
        self.proposals.update(proposal.clone())?;

        info!(
            proposal_id = %proposal.id,
            target_role = %proposal.target_role,
            new_version,
            snapshot_label = %label,
            "mutation applied"
        );

        Ok(ApplyReceipt { new_version, snapshot_id, snapshot_label: label })
    }

    /// Restore the full spec document from a snapshot.
    ///
    /// Permitted at any time as an operational escape hatch — not gated by
    /// proposal state. The snapshot's content hash is verified first, and a
    /// fresh snapshot of the pre-rollback state is written under the same
    /// lock, so the restore is itself undoable and version labels are never
    /// reused. When the snapshot references a currently `applied` proposal,
    /// that proposal is flipped to `rolled_back`.
    pub fn rollback(&self, snapshot_id: &SnapshotId, operator: &str) -> RegentResult<RollbackReceipt> {
        let snapshot = self
            .snapshots
            .get(snapshot_id)?
            .ok_or_else(|| RegentError::SnapshotNotFound { id: snapshot_id.to_string() })?;

        if !verify_snapshot(&snapshot) {
            return Err(RegentError::SnapshotCorrupt { id: snapshot_id.to_string() });
        }

        let guard = acquire_with_retry(
            self.lock.as_ref(),
            self.config.max_lock_attempts,
            Duration::from_millis(self.config.lock_backoff_ms),
        )?;

        let current = self.store.load_all()?;
        let label = self.snapshots.next_label()?;
        let pre_rollback = build_snapshot(current, label, None, operator);
        self.snapshots.append(pre_rollback)?;

        self.store.replace_all(snapshot.specs.clone())?;
        drop(guard);

        if let Some(proposal_id) = snapshot.proposal_id {
            if let Some(mut proposal) = self.proposals.get(&proposal_id)? {
                if proposal.status == ProposalStatus::Applied {
                    proposal.status = ProposalStatus::RolledBack;
                    self.proposals.update(proposal)?;
                }
            }
        }

        info!(
            snapshot_id = %snapshot.snapshot_id,
            restored_label = %snapshot.label,
            operator = %operator,
            "spec store rolled back"
        );

        Ok(RollbackReceipt {
            restored_label: snapshot.label,
            store_version: self.store.store_version(),
        })
    }

    fn fetch(&self, id: &ProposalId) -> RegentResult<MutationProposal> {
        self.proposals
            .get(id)?
            .ok_or_else(|| RegentError::ProposalNotFound { id: id.to_string() })
    }
}

/// Apply one rule change to a copy of the spec document.
///
/// `AddRule` appends unless the rule is already present (idempotent);
/// `RemoveRule` removes the exactly matching entry and errors if absent.
/// The target spec's version is bumped either way.
fn apply_change(
    specs: &BTreeMap<String, AgentSpec>,
    proposal: &MutationProposal,
) -> RegentResult<BTreeMap<String, AgentSpec>> {
    let mut mutated = specs.clone();
    let spec = mutated
        .get_mut(&proposal.target_role)
        .ok_or_else(|| RegentError::SpecNotFound { role: proposal.target_role.clone() })?;

    match proposal.change_type {
        ChangeType::AddRule => {
            if !spec.rules.contains(&proposal.change_content) {
                spec.rules.push(proposal.change_content.clone());
            }
        }
        ChangeType::RemoveRule => {
            let before = spec.rules.len();
            spec.rules.retain(|r| r != &proposal.change_content);
            if spec.rules.len() == before {
                return Err(RegentError::Validation {
                    errors: vec![format!(
                        "rule to remove not found for role '{}': '{}'",
                        proposal.target_role, proposal.change_content
                    )],
                });
            }
        }
    }

    spec.version += 1;
    Ok(mutated)
}

// ── Tests ────────────────────────────────────────────────────────────────────
