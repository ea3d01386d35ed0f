//! # regent-store
//!
//! Versioned spec storage for the REGENT orchestration core.
//!
//! Each persistence concern sits behind a trait with an in-memory reference
//! implementation:
//!
//! - `SpecStore` — the current behavior spec of every agent, with a
//!   store-wide monotonic version counter bumped on every committed write.
//! - `SnapshotStore` — append-only `SpecVersionSnapshot` history, the sole
//!   rollback mechanism. Every snapshot carries a SHA-256 content hash.
//! - `ProposalStore` — mutation proposal rows, updated in place through the
//!   proposal lifecycle.
//! - `WriteLock` — the advisory mutual-exclusion lock serializing all spec
//!   writes across service replicas.
//! - `SpecCache` — a lock-free versioned read cache; readers refresh lazily
//!   when their loaded version falls behind the store counter.
//!
//! Pipeline reads go through the cache without locking; only mutation takes
//! the lock. Eventual consistency on the read path is acceptable — a spec
//! reload taking effect one request late is not a correctness violation.

pub mod cache;
pub mod lock;
pub mod proposals;
pub mod snapshot;
pub mod store;

pub use cache::SpecCache;
pub use lock::{acquire_with_retry, InMemoryWriteLock, LockGuard, WriteLock};
pub use proposals::{InMemoryProposalStore, ProposalStore};
pub use snapshot::{build_snapshot, content_hash, verify_snapshot, InMemorySnapshotStore, SnapshotStore};
pub use store::{validate_specs, InMemorySpecStore, SpecStore};
