//! Mutation proposal persistence.
//!
//! Proposals live in the same relational store as specs and snapshots,
//! with a foreign-key link from snapshot to proposal. The mutation engine
//! reads and updates them through this interface; rows are updated in
//! place as the proposal moves through its lifecycle, never deleted.

use std::sync::Mutex;

use regent_contracts::{
    error::{RegentError, RegentResult},
    mutation::{MutationProposal, ProposalId},
};

/// Storage interface for mutation proposals.
pub trait ProposalStore: Send + Sync {
    /// Insert a newly created proposal.
    fn insert(&self, proposal: MutationProposal) -> RegentResult<()>;

    /// Fetch a proposal by id.
    fn get(&self, id: &ProposalId) -> RegentResult<Option<MutationProposal>>;

    /// Replace an existing proposal's row. Errors if the id is unknown.
    fn update(&self, proposal: MutationProposal) -> RegentResult<()>;

    /// All proposals in insertion order.
    fn list(&self) -> RegentResult<Vec<MutationProposal>>;
}

/// Mutex-protected in-memory `ProposalStore`.
pub struct InMemoryProposalStore {
    proposals: Mutex<Vec<MutationProposal>>,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self { proposals: Mutex::new(Vec::new()) }
    }

    fn locked(&self) -> RegentResult<std::sync::MutexGuard<'_, Vec<MutationProposal>>> {
        self.proposals.lock().map_err(|e| RegentError::StoreWriteFailed {
            reason: format!("proposal store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryProposalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn insert(&self, proposal: MutationProposal) -> RegentResult<()> {
        self.locked()?.push(proposal);
        Ok(())
    }

    fn get(&self, id: &ProposalId) -> RegentResult<Option<MutationProposal>> {
        Ok(self.locked()?.iter().find(|p| &p.id == id).cloned())
    }

    fn update(&self, proposal: MutationProposal) -> RegentResult<()> {
        let mut proposals = self.locked()?;
        match proposals.iter_mut().find(|p| p.id == proposal.id) {
            Some(slot) => {
                *slot = proposal;
                Ok(())
            }
            None => Err(RegentError::ProposalNotFound { id: proposal.id.to_string() }),
        }
    }

    fn list(&self) -> RegentResult<Vec<MutationProposal>> {
        Ok(self.locked()?.clone())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regent_contracts::mutation::{ChangeType, ProposalStatus, RiskLevel};

    fn proposal() -> MutationProposal {
        MutationProposal {
            id: ProposalId::new(),
            target_role: "code_writer".to_string(),
            change_type: ChangeType::AddRule,
            change_content: "include type hints".to_string(),
            risk_level: RiskLevel::Low,
            confidence: 0.8,
            rollback_strategy: "remove the added rule".to_string(),
            status: ProposalStatus::Pending,
            reviewed_by: None,
            created_at: Utc::now(),
            applied_at: None,
        }
    }

    #[test]
    fn insert_get_update_round_trip() {
        let store = InMemoryProposalStore::new();
        let mut p = proposal();
        let id = p.id;
        store.insert(p.clone()).unwrap();

        assert_eq!(store.get(&id).unwrap().unwrap().status, ProposalStatus::Pending);

        p.status = ProposalStatus::Approved;
        store.update(p).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().status, ProposalStatus::Approved);
    }

    #[test]
    fn update_of_unknown_proposal_errors() {
        let store = InMemoryProposalStore::new();
        assert!(matches!(
            store.update(proposal()),
            Err(RegentError::ProposalNotFound { .. })
        ));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = InMemoryProposalStore::new();
        let first = proposal();
        let second = proposal();
        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }
}
