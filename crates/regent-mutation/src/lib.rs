//! # regent-mutation
//!
//! Governed mutation of agent behavior specs ("DNA") for the REGENT
//! orchestration core.
//!
//! Every change to an agent's rule set moves through a forward-only
//! lifecycle — propose → review → apply — with rollback reachable only
//! from the applied state. Applying is gated three ways before any write:
//! the risk/confidence table, a denylist scan of the rule text, and a full
//! dependency graph re-validation. The write itself happens under the
//! cross-process advisory lock, after a content-hashed snapshot of the
//! pre-change state, as a single atomic document replace.

pub mod denylist;
pub mod engine;
pub mod proposal;

pub use denylist::Denylist;
pub use engine::{MutationConfig, MutationEngine};
pub use proposal::ProposalDraft;
