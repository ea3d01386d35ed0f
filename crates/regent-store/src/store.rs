//! The spec store: current behavior specs, keyed by role.
//!
//! All writes validate the document first and are committed as a whole —
//! a failed write leaves the store exactly as it was. The store-wide
//! version counter increments on every committed write so versioned caches
//! can detect staleness without a broadcast.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::{debug, info};

use regent_contracts::{
    error::{RegentError, RegentResult},
    spec::AgentSpec,
};

/// Storage interface for agent behavior specs.
///
/// Implementations back onto a relational store with a unique constraint on
/// `role`; `InMemorySpecStore` is the reference implementation used by tests
/// and the demo.
pub trait SpecStore: Send + Sync {
    /// Return the full spec document, keyed by role.
    fn load_all(&self) -> RegentResult<BTreeMap<String, AgentSpec>>;

    /// Return one spec by role, or `None` if absent.
    fn get(&self, role: &str) -> RegentResult<Option<AgentSpec>>;

    /// Create or overwrite one spec. The spec is validated first.
    fn upsert(&self, spec: AgentSpec) -> RegentResult<()>;

    /// Replace the entire document in one atomic write.
    ///
    /// This is the only write path the mutation engine uses — never
    /// field-by-field updates. The document is validated before the swap;
    /// a validation failure leaves the previous contents untouched.
    fn replace_all(&self, specs: BTreeMap<String, AgentSpec>) -> RegentResult<()>;

    /// Mark a spec inactive. Specs are never deleted.
    fn deactivate(&self, role: &str) -> RegentResult<()>;

    /// The store-wide monotonic version counter.
    ///
    /// Starts at 0 for an empty store and increments on every committed
    /// write. Readers compare against this to refresh lazily.
    fn store_version(&self) -> u64;
}

/// Validate a whole spec document before it is written.
///
/// Checks that every map key equals its spec's `role` and that each spec
/// passes its own structural validation. All failures are collected.
pub fn validate_specs(specs: &BTreeMap<String, AgentSpec>) -> RegentResult<()> {
    let mut errors = Vec::new();

    for (key, spec) in specs {
        if key != &spec.role {
            errors.push(format!("document key '{}' does not match spec role '{}'", key, spec.role));
        }
        errors.extend(spec.validate());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegentError::MalformedSpec { reason: errors.join("; ") })
    }
}

// ── In-memory reference implementation ────────────────────────────────────────

struct StoreState {
    specs: BTreeMap<String, AgentSpec>,
    version: u64,
}

/// Mutex-protected in-memory `SpecStore`.
pub struct InMemorySpecStore {
    state: Mutex<StoreState>,
}

impl InMemorySpecStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState { specs: BTreeMap::new(), version: 0 }),
        }
    }

    /// Create a store pre-seeded with `specs`, committed as one write.
    pub fn seeded(specs: Vec<AgentSpec>) -> RegentResult<Self> {
        let store = Self::new();
        let document: BTreeMap<String, AgentSpec> =
            specs.into_iter().map(|s| (s.role.clone(), s)).collect();
        store.replace_all(document)?;
        Ok(store)
    }

    fn locked(&self) -> RegentResult<std::sync::MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| RegentError::StoreWriteFailed {
            reason: format!("spec store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemorySpecStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecStore for InMemorySpecStore {
    fn load_all(&self) -> RegentResult<BTreeMap<String, AgentSpec>> {
        Ok(self.locked()?.specs.clone())
    }

    fn get(&self, role: &str) -> RegentResult<Option<AgentSpec>> {
        Ok(self.locked()?.specs.get(role).cloned())
    }

    fn upsert(&self, spec: AgentSpec) -> RegentResult<()> {
        let errors = spec.validate();
        if !errors.is_empty() {
            return Err(RegentError::MalformedSpec { reason: errors.join("; ") });
        }

        let mut state = self.locked()?;
        debug!(role = %spec.role, version = spec.version, "upserting spec");
        state.specs.insert(spec.role.clone(), spec);
        state.version += 1;
        Ok(())
    }

    fn replace_all(&self, specs: BTreeMap<String, AgentSpec>) -> RegentResult<()> {
        validate_specs(&specs)?;

        let mut state = self.locked()?;
        state.specs = specs;
        state.version += 1;
        info!(store_version = state.version, roles = state.specs.len(), "spec document replaced");
        Ok(())
    }

    fn deactivate(&self, role: &str) -> RegentResult<()> {
        let mut state = self.locked()?;
        let spec = state
            .specs
            .get_mut(role)
            .ok_or_else(|| RegentError::SpecNotFound { role: role.to_string() })?;
        spec.is_active = false;
        state.version += 1;
        info!(role = %role, "spec deactivated");
        Ok(())
    }

    fn store_version(&self) -> u64 {
        self.state.lock().map(|s| s.version).unwrap_or(0)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
