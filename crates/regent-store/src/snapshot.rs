//! Append-only snapshot history with SHA-256 content hashing.
//!
//! A `SpecVersionSnapshot` is written immediately before every mutation is
//! applied and before every rollback restores. The content hash commits to
//! the canonical JSON of the spec document; rollback refuses a snapshot
//! whose stored hash no longer matches its contents.
//!
//! Labels are `v1`, `v2`, … in append order and are never reused — the
//! store is append-only, so the count can only grow.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;

use regent_contracts::{
    error::{RegentError, RegentResult},
    mutation::{ProposalId, SnapshotId, SpecVersionSnapshot},
    spec::AgentSpec,
};

/// Compute the SHA-256 content hash of a spec document.
///
/// `BTreeMap` serialization is key-ordered, so the same document always
/// produces the same canonical bytes.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if the document cannot be serialized to JSON — which cannot
/// happen for the well-formed `AgentSpec` type.
pub fn content_hash(specs: &BTreeMap<String, AgentSpec>) -> String {
    let bytes =
        serde_json::to_vec(specs).expect("spec document must always be serializable to JSON");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Recompute a snapshot's content hash and compare against the stored value.
pub fn verify_snapshot(snapshot: &SpecVersionSnapshot) -> bool {
    content_hash(&snapshot.specs) == snapshot.content_hash
}

/// Storage interface for the append-only snapshot history.
pub trait SnapshotStore: Send + Sync {
    /// Allocate the next monotonic label (`v1`, `v2`, …).
    fn next_label(&self) -> RegentResult<String>;

    /// Append one snapshot. Snapshots are never modified or deleted.
    fn append(&self, snapshot: SpecVersionSnapshot) -> RegentResult<()>;

    /// Fetch a snapshot by id.
    fn get(&self, id: &SnapshotId) -> RegentResult<Option<SpecVersionSnapshot>>;

    /// The most recently appended snapshot, if any.
    fn latest(&self) -> RegentResult<Option<SpecVersionSnapshot>>;

    /// All snapshots in append order.
    fn list(&self) -> RegentResult<Vec<SpecVersionSnapshot>>;
}

/// Build a hashed snapshot of `specs`, ready to append.
pub fn build_snapshot(
    specs: BTreeMap<String, AgentSpec>,
    label: String,
    proposal_id: Option<ProposalId>,
    taken_by: impl Into<String>,
) -> SpecVersionSnapshot {
    let content_hash = content_hash(&specs);
    SpecVersionSnapshot {
        snapshot_id: SnapshotId::new(),
        label,
        specs,
        proposal_id,
        taken_by: taken_by.into(),
        taken_at: Utc::now(),
        content_hash,
    }
}

// ── In-memory reference implementation ────────────────────────────────────────

/// Mutex-protected in-memory `SnapshotStore`.
pub struct InMemorySnapshotStore {
    snapshots: Mutex<Vec<SpecVersionSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self { snapshots: Mutex::new(Vec::new()) }
    }

    fn locked(&self) -> RegentResult<std::sync::MutexGuard<'_, Vec<SpecVersionSnapshot>>> {
        self.snapshots.lock().map_err(|e| RegentError::StoreWriteFailed {
            reason: format!("snapshot store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn next_label(&self) -> RegentResult<String> {
        Ok(format!("v{}", self.locked()?.len() + 1))
    }

    fn append(&self, snapshot: SpecVersionSnapshot) -> RegentResult<()> {
        let mut snapshots = self.locked()?;
        info!(
            snapshot_id = %snapshot.snapshot_id,
            label = %snapshot.label,
            roles = snapshot.specs.len(),
            "snapshot appended"
        );
        snapshots.push(snapshot);
        Ok(())
    }

    fn get(&self, id: &SnapshotId) -> RegentResult<Option<SpecVersionSnapshot>> {
        Ok(self.locked()?.iter().find(|s| &s.snapshot_id == id).cloned())
    }

    fn latest(&self) -> RegentResult<Option<SpecVersionSnapshot>> {
        Ok(self.locked()?.last().cloned())
    }

    fn list(&self) -> RegentResult<Vec<SpecVersionSnapshot>> {
        Ok(self.locked()?.clone())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
