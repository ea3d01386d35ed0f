//! The agent endpoint registry.
//!
//! Maps each role to a network address and an operational status. Only
//! `Active` entries resolve; a pipeline step whose role is `Disabled` or in
//! `Maintenance` fails as a transport error, exactly as an unreachable
//! address would.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Operational status of a registered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    /// Resolvable and callable.
    Active,
    /// Administratively switched off.
    Disabled,
    /// Temporarily unavailable; expected to return.
    Maintenance,
}

/// Where and whether one role can be reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEndpoint {
    /// Transport-specific address (URL for HTTP, symbolic name in-process).
    pub address: String,
    /// Only `Active` endpoints are resolvable.
    pub status: EndpointStatus,
}

impl AgentEndpoint {
    /// An active endpoint at `address`.
    pub fn active(address: impl Into<String>) -> Self {
        Self { address: address.into(), status: EndpointStatus::Active }
    }
}

/// The role → endpoint registry consulted before every agent call.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    entries: BTreeMap<String, AgentEndpoint>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the endpoint for `role`.
    pub fn register(&mut self, role: impl Into<String>, endpoint: AgentEndpoint) {
        self.entries.insert(role.into(), endpoint);
    }

    /// Change the status of an existing entry. No-op for unknown roles.
    pub fn set_status(&mut self, role: &str, status: EndpointStatus) {
        if let Some(entry) = self.entries.get_mut(role) {
            entry.status = status;
        }
    }

    /// Resolve `role` to its endpoint, only if the entry is `Active`.
    pub fn resolve(&self, role: &str) -> Option<&AgentEndpoint> {
        self.entries
            .get(role)
            .filter(|e| e.status == EndpointStatus::Active)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_entries_resolve() {
        let mut registry = AgentRegistry::new();
        registry.register("code_writer", AgentEndpoint::active("inproc://code_writer"));
        registry.register(
            "code_reviewer",
            AgentEndpoint { address: "inproc://code_reviewer".to_string(), status: EndpointStatus::Maintenance },
        );

        assert!(registry.resolve("code_writer").is_some());
        assert!(registry.resolve("code_reviewer").is_none());
        assert!(registry.resolve("ghost").is_none());
    }

    #[test]
    fn set_status_flips_resolvability() {
        let mut registry = AgentRegistry::new();
        registry.register("code_writer", AgentEndpoint::active("inproc://code_writer"));

        registry.set_status("code_writer", EndpointStatus::Disabled);
        assert!(registry.resolve("code_writer").is_none());

        registry.set_status("code_writer", EndpointStatus::Active);
        assert!(registry.resolve("code_writer").is_some());
    }
}
