//! Declared-output-schema verification.
//!
//! Every agent spec declares the structure of its output as a JSON Schema
//! document. The engine checks each reply against the invoked role's schema
//! before accepting the step; a violating reply is a malformed agent
//! response and halts the run as an execution error.

use tracing::warn;

use serde_json::Value;

/// Check `output` against the role's declared schema.
///
/// Returns every violation found, empty on pass. A `Null` schema means the
/// role declares no structural constraint and always passes. A schema
/// document that itself fails to compile is reported as a single violation
/// so the run can still be recorded rather than crashing the engine.
pub fn verify_output(role: &str, schema: &Value, output: &Value) -> Vec<String> {
    if schema.is_null() {
        return Vec::new();
    }

    match jsonschema::validator_for(schema) {
        Ok(validator) => {
            let violations: Vec<String> = validator
                .iter_errors(output)
                .map(|error| format!("output schema violation at {}: {}", error.instance_path, error))
                .collect();
            if !violations.is_empty() {
                warn!(role = %role, count = violations.len(), "agent output failed declared schema");
            }
            violations
        }
        Err(e) => {
            let message = format!("declared output schema for '{}' is invalid: {}", role, e);
            warn!(%message, "schema compilation failure");
            vec![message]
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
