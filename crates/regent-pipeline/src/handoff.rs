//! Role-pair-keyed handoff transforms.
//!
//! Between step *i* and step *i+1*, the previous step's output is reshaped
//! into the form the next agent expects. A transform is declared for a
//! specific `(from_role, to_role)` pair; pairs with no declaration pass the
//! output through unchanged.
//!
//! Two declaration styles:
//!
//! - **Field maps** — declarative extract/rename rules, deserializable from
//!   the engine's TOML config.
//! - **Custom closures** — registered programmatically for reshaping a
//!   field map cannot express.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One extract/rename rule within a field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Dot-notation path into the previous step's output (e.g. "review.code").
    pub from: String,
    /// The key to place the extracted value under in the next input.
    pub to: String,
    /// Value used when the source path is missing or null.
    #[serde(default)]
    pub default: Option<Value>,
}

/// A declarative transform for one role pair, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffDecl {
    pub from_role: String,
    pub to_role: String,
    pub fields: Vec<FieldMapping>,
}

/// A handoff transform: either a declarative field map or a custom closure.
enum Transform {
    Fields(Vec<FieldMapping>),
    Custom(Box<dyn Fn(&Value) -> Value + Send + Sync>),
}

/// The role-pair-keyed transform table consulted between every two steps.
#[derive(Default)]
pub struct HandoffMap {
    transforms: HashMap<(String, String), Transform>,
}

impl HandoffMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from declarative TOML declarations.
    pub fn from_decls(decls: &[HandoffDecl]) -> Self {
        let mut map = Self::new();
        for decl in decls {
            map.declare_fields(&decl.from_role, &decl.to_role, decl.fields.clone());
        }
        map
    }

    /// Declare a field-map transform for `(from_role, to_role)`.
    pub fn declare_fields(&mut self, from_role: &str, to_role: &str, fields: Vec<FieldMapping>) {
        self.transforms.insert(
            (from_role.to_string(), to_role.to_string()),
            Transform::Fields(fields),
        );
    }

    /// Register a custom transform closure for `(from_role, to_role)`.
    pub fn register(
        &mut self,
        from_role: &str,
        to_role: &str,
        f: Box<dyn Fn(&Value) -> Value + Send + Sync>,
    ) {
        self.transforms.insert(
            (from_role.to_string(), to_role.to_string()),
            Transform::Custom(f),
        );
    }

    /// Apply the transform declared for `(from_role, to_role)` to `output`.
    ///
    /// The default transform passes the output through unchanged.
    pub fn apply(&self, from_role: &str, to_role: &str, output: &Value) -> Value {
        match self
            .transforms
            .get(&(from_role.to_string(), to_role.to_string()))
        {
            None => output.clone(),
            Some(Transform::Custom(f)) => {
                debug!(from = %from_role, to = %to_role, "applying custom handoff transform");
                f(output)
            }
            Some(Transform::Fields(fields)) => {
                debug!(from = %from_role, to = %to_role, "applying field-map handoff transform");
                let mut shaped = Map::new();
                for mapping in fields {
                    let value = resolve_path(output, &mapping.from)
                        .cloned()
                        .or_else(|| mapping.default.clone())
                        .unwrap_or(Value::Null);
                    shaped.insert(mapping.to.clone(), value);
                }
                Value::Object(shaped)
            }
        }
    }
}

/// Resolve a dot-notation path against a JSON value. Returns `None` when
/// any segment is missing or the value is JSON `null`.
fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn undeclared_pair_passes_through_unchanged() {
        let map = HandoffMap::new();
        let output = json!({"code": "fn main() {}", "language": "rust"});
        assert_eq!(map.apply("code_writer", "code_reviewer", &output), output);
    }

    #[test]
    fn field_map_extracts_and_renames() {
        let mut map = HandoffMap::new();
        map.declare_fields(
            "code_writer",
            "code_reviewer",
            vec![
                FieldMapping { from: "code".to_string(), to: "code_to_review".to_string(), default: None },
                FieldMapping { from: "language".to_string(), to: "language".to_string(), default: None },
            ],
        );

        let output = json!({"code": "fn main() {}", "language": "rust", "noise": true});
        let shaped = map.apply("code_writer", "code_reviewer", &output);
        assert_eq!(shaped, json!({"code_to_review": "fn main() {}", "language": "rust"}));
    }

    #[test]
    fn missing_source_falls_back_to_default_then_null() {
        let mut map = HandoffMap::new();
        map.declare_fields(
            "a",
            "b",
            vec![
                FieldMapping {
                    from: "language".to_string(),
                    to: "language".to_string(),
                    default: Some(json!("unknown")),
                },
                FieldMapping { from: "tests".to_string(), to: "tests".to_string(), default: None },
            ],
        );

        let shaped = map.apply("a", "b", &json!({"code": "x"}));
        assert_eq!(shaped, json!({"language": "unknown", "tests": null}));
    }

    #[test]
    fn nested_paths_resolve_with_dots() {
        let mut map = HandoffMap::new();
        map.declare_fields(
            "a",
            "b",
            vec![FieldMapping { from: "review.verdict".to_string(), to: "verdict".to_string(), default: None }],
        );

        let shaped = map.apply("a", "b", &json!({"review": {"verdict": "APPROVE"}}));
        assert_eq!(shaped, json!({"verdict": "APPROVE"}));
    }

    #[test]
    fn custom_transform_wins_for_its_pair() {
        let mut map = HandoffMap::new();
        map.register(
            "a",
            "b",
            Box::new(|output| json!({"previous_output": output})),
        );

        let shaped = map.apply("a", "b", &json!({"x": 1}));
        assert_eq!(shaped, json!({"previous_output": {"x": 1}}));
    }

    #[test]
    fn decls_build_the_same_transforms() {
        let decls = vec![HandoffDecl {
            from_role: "code_writer".to_string(),
            to_role: "code_reviewer".to_string(),
            fields: vec![FieldMapping { from: "code".to_string(), to: "code_to_review".to_string(), default: None }],
        }];

        let map = HandoffMap::from_decls(&decls);
        let shaped = map.apply("code_writer", "code_reviewer", &json!({"code": "x"}));
        assert_eq!(shaped, json!({"code_to_review": "x"}));
    }
}
