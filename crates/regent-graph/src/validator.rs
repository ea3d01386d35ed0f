//! The dependency graph validator.
//!
//! Three invariants are certified over the set of *active* specs:
//!
//! 1. **Acyclic** — no handoff chain may return to an earlier role.
//! 2. **No phantoms** — every declared dependency resolves to an active spec.
//! 3. **No orphans** — every active role participates in the graph (has a
//!    caller or declared callees) unless explicitly marked terminal.
//!
//! All violations are collected into one `GraphReport`; validation never
//! short-circuits on the first failure.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use regent_contracts::{
    graph::{DependencyEdge, GraphReport},
    spec::AgentSpec,
};

/// Materialize the directed handoff edges declared by active specs.
///
/// Edges are derived on demand and never stored; an edge whose callee does
/// not resolve to an active spec is still returned here — `validate` is
/// what classifies it as a phantom.
pub fn edges(specs: &BTreeMap<String, AgentSpec>) -> Vec<DependencyEdge> {
    specs
        .values()
        .filter(|s| s.is_active)
        .flat_map(|s| {
            s.dependencies.iter().map(move |dep| DependencyEdge {
                caller: s.role.clone(),
                callee: dep.clone(),
            })
        })
        .collect()
}

/// Validate the full spec set and return a collected report.
///
/// Inactive specs contribute nothing: they are excluded from the adjacency,
/// and a dependency pointing at an inactive spec is a phantom.
///
/// Cycle detection is DFS with recursion-stack marking, so each cycle error
/// names the actual roles on the cycle in handoff order.
pub fn validate(specs: &BTreeMap<String, AgentSpec>) -> GraphReport {
    let active: BTreeMap<&str, &AgentSpec> = specs
        .values()
        .filter(|s| s.is_active)
        .map(|s| (s.role.as_str(), s))
        .collect();

    debug!(active_roles = active.len(), "validating dependency graph");

    let mut errors = Vec::new();

    // ── Phantom dependencies ─────────────────────────────────────────────────
    for edge in edges(specs) {
        if !active.contains_key(edge.callee.as_str()) {
            errors.push(format!(
                "phantom dependency: {} -> {} (not an active spec)",
                edge.caller, edge.callee
            ));
        }
    }

    // ── Cycles ───────────────────────────────────────────────────────────────
    //
    // Phantom edges are skipped here; they are already reported above and
    // cannot close a cycle through a node that does not exist.
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    for &role in active.keys() {
        if visited.contains(role) {
            continue;
        }
        let mut stack: Vec<&str> = Vec::new();
        if let Some(cycle) = dfs_cycle(role, &active, &mut visited, &mut stack) {
            errors.push(format!("circular dependency: {}", cycle.join(" -> ")));
        }
    }

    // ── Orphans ──────────────────────────────────────────────────────────────
    //
    // A role with outgoing edges is an entry point, not an orphan. Only a
    // fully disconnected, non-terminal role is flagged.
    let referenced: BTreeSet<&str> = active
        .values()
        .flat_map(|s| s.dependencies.iter().map(|d| d.as_str()))
        .collect();

    for spec in active.values() {
        if spec.is_terminal || !spec.dependencies.is_empty() {
            continue;
        }
        if !referenced.contains(spec.role.as_str()) {
            errors.push(format!(
                "orphan role: {} (no callers, no dependencies, not terminal)",
                spec.role
            ));
        }
    }

    if !errors.is_empty() {
        warn!(error_count = errors.len(), "dependency graph is unhealthy");
    }

    GraphReport::from_errors(errors)
}

/// DFS from `role`, returning the first cycle found as an ordered path.
fn dfs_cycle<'a>(
    role: &'a str,
    active: &BTreeMap<&'a str, &'a AgentSpec>,
    visited: &mut BTreeSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(pos) = stack.iter().position(|r| *r == role) {
        // The slice from the first occurrence to here, closed with `role`,
        // is the cycle in handoff order.
        let mut cycle: Vec<String> = stack[pos..].iter().map(|r| r.to_string()).collect();
        cycle.push(role.to_string());
        return Some(cycle);
    }
    if visited.contains(role) {
        return None;
    }

    visited.insert(role);
    stack.push(role);

    if let Some(spec) = active.get(role) {
        for dep in &spec.dependencies {
            if !active.contains_key(dep.as_str()) {
                continue; // phantom, reported separately
            }
            if let Some(cycle) = dfs_cycle(dep.as_str(), active, visited, stack) {
                return Some(cycle);
            }
        }
    }

    stack.pop();
    None
}

/// Return true when `caller` has declared `callee` as a permitted handoff.
///
/// Both roles must exist as active specs. Used by the pipeline engine to
/// check each adjacent pair of a hand-authored step list.
pub fn can_hand_off(specs: &BTreeMap<String, AgentSpec>, caller: &str, callee: &str) -> bool {
    let (Some(caller_spec), Some(callee_spec)) = (specs.get(caller), specs.get(callee)) else {
        return false;
    };
    caller_spec.is_active && callee_spec.is_active && caller_spec.dependencies.contains(callee)
}

/// Render the active dependency graph as a Mermaid `graph TD` document.
///
/// Terminal roles get a `:::terminal` class so they render distinctly.
pub fn to_mermaid(specs: &BTreeMap<String, AgentSpec>) -> String {
    let mut lines = vec!["graph TD".to_string()];

    for spec in specs.values().filter(|s| s.is_active && s.is_terminal) {
        lines.push(format!("    {}[{}]:::terminal", spec.role, spec.role));
    }
    for edge in edges(specs) {
        lines.push(format!("    {} --> {}", edge.caller, edge.callee));
    }

    lines.push(String::new());
    lines.push("    classDef terminal fill:#90EE90,stroke:#228B22".to_string());
    lines.join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use regent_contracts::spec::AgentSpec;

    fn spec(role: &str, deps: &[&str]) -> AgentSpec {
        let mut s = AgentSpec::new(role, format!("Reference {role} agent used in validator tests"));
        s.dependencies = deps.iter().map(|d| d.to_string()).collect();
        s
    }

    fn spec_set(specs: Vec<AgentSpec>) -> BTreeMap<String, AgentSpec> {
        specs.into_iter().map(|s| (s.role.clone(), s)).collect()
    }

    #[test]
    fn healthy_dag_has_empty_error_list() {
        let mut reviewer = spec("code_reviewer", &[]);
        reviewer.is_terminal = true;
        let specs = spec_set(vec![spec("code_writer", &["code_reviewer"]), reviewer]);

        let report = validate(&specs);
        assert!(report.is_healthy);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn two_cycle_is_reported_with_roles_named() {
        let specs = spec_set(vec![spec("a", &["b"]), spec("b", &["a"])]);

        let report = validate(&specs);
        assert!(!report.is_healthy);
        let cycle_err = report
            .errors
            .iter()
            .find(|e| e.contains("circular"))
            .expect("cycle error missing");
        assert!(cycle_err.contains("a") && cycle_err.contains("b"));
    }

    #[test]
    fn three_cycle_is_detected() {
        let specs = spec_set(vec![spec("a", &["b"]), spec("b", &["c"]), spec("c", &["a"])]);
        let report = validate(&specs);
        assert!(!report.is_healthy);
        assert!(report.errors.iter().any(|e| e.contains("circular")));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let specs = spec_set(vec![spec("a", &["a"])]);
        let report = validate(&specs);
        assert!(report.errors.iter().any(|e| e.contains("circular") && e.contains("a -> a")));
    }

    #[test]
    fn phantom_dependency_is_reported() {
        let specs = spec_set(vec![spec("a", &["ghost"])]);
        let report = validate(&specs);
        assert!(!report.is_healthy);
        assert!(report.errors.iter().any(|e| e.contains("phantom") && e.contains("ghost")));
    }

    #[test]
    fn dependency_on_inactive_spec_is_phantom() {
        let mut retired = spec("retired", &[]);
        retired.is_active = false;
        let specs = spec_set(vec![spec("a", &["retired"]), retired]);

        let report = validate(&specs);
        assert!(report.errors.iter().any(|e| e.contains("phantom") && e.contains("retired")));
    }

    #[test]
    fn disconnected_non_terminal_role_is_orphan() {
        let mut reviewer = spec("code_reviewer", &[]);
        reviewer.is_terminal = true;
        let specs = spec_set(vec![
            spec("code_writer", &["code_reviewer"]),
            reviewer,
            spec("drifter", &[]),
        ]);

        let report = validate(&specs);
        assert!(!report.is_healthy);
        assert!(report.errors.iter().any(|e| e.contains("orphan") && e.contains("drifter")));
    }

    #[test]
    fn terminal_flag_exempts_from_orphan_check() {
        let mut terminal = spec("script_writer", &[]);
        terminal.is_terminal = true;
        let specs = spec_set(vec![terminal]);

        let report = validate(&specs);
        assert!(report.is_healthy);
    }

    #[test]
    fn entry_point_with_dependencies_is_not_orphan() {
        let mut writer = spec("script_writer", &[]);
        writer.is_terminal = true;
        // Nothing references video_planner, but it declares a callee.
        let specs = spec_set(vec![spec("video_planner", &["script_writer"]), writer]);

        let report = validate(&specs);
        assert!(report.is_healthy);
    }

    #[test]
    fn simultaneous_errors_are_all_collected() {
        // One cycle, one phantom, one orphan — all three in a single report.
        let specs = spec_set(vec![
            spec("a", &["b"]),
            spec("b", &["a"]),
            spec("c", &["ghost"]),
            spec("drifter", &[]),
        ]);

        let report = validate(&specs);
        assert!(!report.is_healthy);
        assert!(report.errors.iter().any(|e| e.contains("circular")));
        assert!(report.errors.iter().any(|e| e.contains("phantom")));
        assert!(report.errors.iter().any(|e| e.contains("orphan")));
    }

    #[test]
    fn inactive_specs_are_excluded_entirely() {
        // The cycle runs through an inactive role, so no cycle exists among
        // active specs; the dangling edge becomes a phantom instead.
        let mut b = spec("b", &["a"]);
        b.is_active = false;
        let specs = spec_set(vec![spec("a", &["b"]), b]);

        let report = validate(&specs);
        assert!(!report.errors.iter().any(|e| e.contains("circular")));
        assert!(report.errors.iter().any(|e| e.contains("phantom")));
    }

    #[test]
    fn can_hand_off_requires_declared_dependency() {
        let mut reviewer = spec("code_reviewer", &[]);
        reviewer.is_terminal = true;
        let specs = spec_set(vec![spec("code_writer", &["code_reviewer"]), reviewer]);

        assert!(can_hand_off(&specs, "code_writer", "code_reviewer"));
        assert!(!can_hand_off(&specs, "code_reviewer", "code_writer"));
        assert!(!can_hand_off(&specs, "code_writer", "ghost"));
    }

    #[test]
    fn can_hand_off_rejects_inactive_callee() {
        let mut reviewer = spec("code_reviewer", &[]);
        reviewer.is_active = false;
        let specs = spec_set(vec![spec("code_writer", &["code_reviewer"]), reviewer]);

        assert!(!can_hand_off(&specs, "code_writer", "code_reviewer"));
    }

    #[test]
    fn edges_are_derived_from_active_specs_only() {
        let mut retired = spec("retired", &["code_writer"]);
        retired.is_active = false;
        let specs = spec_set(vec![spec("code_writer", &["code_reviewer"]), retired]);

        let derived = edges(&specs);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].caller, "code_writer");
        assert_eq!(derived[0].callee, "code_reviewer");
    }

    #[test]
    fn mermaid_renders_edges_and_terminal_class() {
        let mut reviewer = spec("code_reviewer", &[]);
        reviewer.is_terminal = true;
        let specs = spec_set(vec![spec("code_writer", &["code_reviewer"]), reviewer]);

        let mermaid = to_mermaid(&specs);
        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("code_writer --> code_reviewer"));
        assert!(mermaid.contains("code_reviewer[code_reviewer]:::terminal"));
    }
}
