//! # regent-contracts
//!
//! Shared types, schemas, and contracts for the REGENT orchestration core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod graph;
pub mod mutation;
pub mod pipeline;
pub mod spec;

#[cfg(test)]
mod tests {
    use super::*;
    use error::RegentError;
    use mutation::{ChangeType, ProposalId, ProposalStatus, RiskLevel};
    use pipeline::{AgentReply, RunStatus, TraceId};
    use spec::AgentSpec;

    // ── AgentSpec ────────────────────────────────────────────────────────────

    #[test]
    fn spec_new_starts_at_version_one_active() {
        let spec = AgentSpec::new("code_writer", "Generates code from natural language task descriptions");
        assert_eq!(spec.version, 1);
        assert!(spec.is_active);
        assert!(!spec.is_terminal);
        assert!(spec.rules.is_empty());
        assert!(spec.dependencies.is_empty());
    }

    #[test]
    fn spec_validate_accepts_well_formed() {
        let spec = AgentSpec::new("code_writer", "Generates code from natural language task descriptions");
        assert!(spec.validate().is_empty());
    }

    #[test]
    fn spec_validate_rejects_short_purpose() {
        let spec = AgentSpec::new("code_writer", "too short");
        let errors = spec.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at least 20 characters"));
    }

    #[test]
    fn spec_validate_collects_all_failures() {
        let mut spec = AgentSpec::new("", "short");
        spec.version = 0;
        let errors = spec.validate();
        // Empty role, short purpose, zero version — all three reported.
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn spec_round_trips_through_json() {
        let mut spec = AgentSpec::new("code_writer", "Generates code from natural language task descriptions");
        spec.rules.push("output code only".to_string());
        spec.dependencies.insert("code_reviewer".to_string());

        let json = serde_json::to_string(&spec).unwrap();
        let decoded: AgentSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, decoded);
    }

    // ── RiskLevel confidence table ───────────────────────────────────────────

    #[test]
    fn risk_level_confidence_floors() {
        assert_eq!(RiskLevel::Low.min_confidence(), None);
        assert_eq!(RiskLevel::Medium.min_confidence(), None);
        assert_eq!(RiskLevel::High.min_confidence(), Some(0.75));
        assert_eq!(RiskLevel::Critical.min_confidence(), Some(0.90));
    }

    // ── Status serde representations ─────────────────────────────────────────

    #[test]
    fn run_status_uses_snake_case_wire_format() {
        assert_eq!(serde_json::to_string(&RunStatus::HaltedRejected).unwrap(), "\"halted_rejected\"");
        assert_eq!(serde_json::to_string(&RunStatus::HaltedError).unwrap(), "\"halted_error\"");
    }

    #[test]
    fn proposal_status_round_trips() {
        for status in [
            ProposalStatus::Pending,
            ProposalStatus::Approved,
            ProposalStatus::Rejected,
            ProposalStatus::Applied,
            ProposalStatus::RolledBack,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let decoded: ProposalStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, decoded);
        }
    }

    #[test]
    fn change_type_wire_format_matches_store_columns() {
        assert_eq!(serde_json::to_string(&ChangeType::AddRule).unwrap(), "\"add_rule\"");
        assert_eq!(serde_json::to_string(&ChangeType::RemoveRule).unwrap(), "\"remove_rule\"");
    }

    // ── Identifiers ──────────────────────────────────────────────────────────

    #[test]
    fn trace_id_new_produces_unique_values() {
        let ids: Vec<TraceId> = (0..100).map(|_| TraceId::new()).collect();
        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn proposal_id_new_produces_unique_values() {
        let a = ProposalId::new();
        let b = ProposalId::new();
        assert_ne!(a, b);
    }

    // ── AgentReply constructors ──────────────────────────────────────────────

    #[test]
    fn agent_reply_ok_carries_confidence() {
        let reply = AgentReply::ok(serde_json::json!({"code": "fn main() {}"}), 0.9);
        assert!(reply.success);
        assert_eq!(reply.confidence, Some(0.9));
        assert!(reply.error.is_none());
    }

    #[test]
    fn agent_reply_failed_has_null_output() {
        let reply = AgentReply::failed("connection refused");
        assert!(!reply.success);
        assert!(reply.output.is_null());
        assert_eq!(reply.error.as_deref(), Some("connection refused"));
    }

    // ── RegentError display messages ─────────────────────────────────────────

    #[test]
    fn error_validation_joins_all_errors() {
        let err = RegentError::Validation {
            errors: vec!["cycle: a -> b -> a".to_string(), "orphan: c".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("cycle: a -> b -> a"));
        assert!(msg.contains("orphan: c"));
    }

    #[test]
    fn error_spec_not_found_display() {
        let err = RegentError::SpecNotFound { role: "ghost_agent".to_string() };
        assert!(err.to_string().contains("ghost_agent"));
    }

    #[test]
    fn error_lock_contention_display() {
        let err = RegentError::LockContention { attempts: 5 };
        let msg = err.to_string();
        assert!(msg.contains("5 attempts"));
    }

    #[test]
    fn error_illegal_transition_display() {
        let err = RegentError::IllegalTransition {
            from: "rejected".to_string(),
            action: "apply".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("apply"));
        assert!(msg.contains("rejected"));
    }
}
