//! Versioned read cache over the spec store.
//!
//! Each reader holds a `(specs, loaded_at_version)` pair and compares
//! against the store-wide version counter on every read, refreshing lazily
//! when stale. There is no invalidation broadcast — a mutation bumps the
//! counter and readers pick it up on their next read.

use std::collections::BTreeMap;

use tracing::debug;

use regent_contracts::{error::RegentResult, spec::AgentSpec};

use crate::store::SpecStore;

/// A lazily refreshing snapshot of the spec document.
///
/// Not shared between threads — each pipeline worker owns its own cache.
pub struct SpecCache {
    specs: BTreeMap<String, AgentSpec>,
    loaded_at_version: Option<u64>,
}

impl SpecCache {
    /// An empty cache that will load on first read.
    pub fn new() -> Self {
        Self { specs: BTreeMap::new(), loaded_at_version: None }
    }

    /// Return the cached document, refreshing from `store` if the cache has
    /// never loaded or its version has fallen behind the store counter.
    pub fn read(&mut self, store: &dyn SpecStore) -> RegentResult<&BTreeMap<String, AgentSpec>> {
        let current = store.store_version();
        let stale = match self.loaded_at_version {
            None => true,
            Some(loaded) => loaded < current,
        };

        if stale {
            debug!(
                loaded_at = ?self.loaded_at_version,
                store_version = current,
                "spec cache stale, reloading"
            );
            self.specs = store.load_all()?;
            self.loaded_at_version = Some(current);
        }

        Ok(&self.specs)
    }

    /// The store version this cache last loaded at, if it has loaded.
    pub fn loaded_at_version(&self) -> Option<u64> {
        self.loaded_at_version
    }
}

impl Default for SpecCache {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySpecStore;

    fn writer_spec() -> AgentSpec {
        AgentSpec::new("code_writer", "Generates code from natural language task descriptions")
    }

    #[test]
    fn first_read_loads_from_store() {
        let store = InMemorySpecStore::seeded(vec![writer_spec()]).unwrap();
        let mut cache = SpecCache::new();

        let specs = cache.read(&store).unwrap();
        assert!(specs.contains_key("code_writer"));
        assert_eq!(cache.loaded_at_version(), Some(1));
    }

    #[test]
    fn read_is_cached_while_store_version_is_unchanged() {
        let store = InMemorySpecStore::seeded(vec![writer_spec()]).unwrap();
        let mut cache = SpecCache::new();
        cache.read(&store).unwrap();

        // Same version — a second read must not change the loaded marker.
        cache.read(&store).unwrap();
        assert_eq!(cache.loaded_at_version(), Some(1));
    }

    #[test]
    fn store_write_makes_cache_refresh_lazily() {
        let store = InMemorySpecStore::seeded(vec![writer_spec()]).unwrap();
        let mut cache = SpecCache::new();
        cache.read(&store).unwrap();

        let mut updated = writer_spec();
        updated.rules.push("include type hints".to_string());
        updated.version = 2;
        store.upsert(updated).unwrap();

        let specs = cache.read(&store).unwrap();
        assert_eq!(specs["code_writer"].version, 2);
        assert_eq!(cache.loaded_at_version(), Some(2));
    }
}
