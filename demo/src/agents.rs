//! In-process reference agents for the demo.
//!
//! Two pipelines from the reference fleet are wired up with canned logic:
//!
//! - code pipeline: `code_writer` → `code_reviewer` (quality gate)
//! - content pipeline: `video_planner` → `script_writer`
//!
//! All outputs are hardcoded and deterministic. No external API calls are
//! made — in production each role resolves to an HTTP endpoint behind the
//! same `AgentInvoker` trait.

use serde_json::json;

use regent_contracts::{pipeline::AgentReply, spec::AgentSpec};
use regent_pipeline::{
    AgentEndpoint, AgentRegistry, EngineConfig, InProcessInvoker,
};

/// The reference fleet: four active specs forming a healthy graph.
pub fn seed_specs() -> Vec<AgentSpec> {
    let mut code_writer = AgentSpec::new(
        "code_writer",
        "Generates source code from a natural language task description",
    );
    code_writer.rules.push("output code only".to_string());
    code_writer.rules.push("never invent external dependencies".to_string());
    code_writer.dependencies.insert("code_reviewer".to_string());
    code_writer.output_schema = json!({
        "type": "object",
        "required": ["code", "language"],
        "properties": {
            "code": {"type": "string"},
            "language": {"type": "string"}
        }
    });

    let mut code_reviewer = AgentSpec::new(
        "code_reviewer",
        "Reviews generated code for safety and quality, returning a verdict",
    );
    code_reviewer.rules.push("reject code that can panic in production paths".to_string());
    code_reviewer.is_terminal = true;
    code_reviewer.output_schema = json!({
        "type": "object",
        "required": ["verdict", "summary"],
        "properties": {
            "verdict": {"type": "string"},
            "summary": {"type": "string"}
        }
    });

    let mut video_planner = AgentSpec::new(
        "video_planner",
        "Plans a short video as an ordered outline of scenes for the script writer",
    );
    video_planner.dependencies.insert("script_writer".to_string());

    let mut script_writer = AgentSpec::new(
        "script_writer",
        "Writes the final narration script from a scene outline",
    );
    script_writer.is_terminal = true;

    vec![code_writer, code_reviewer, video_planner, script_writer]
}

/// All reference roles registered as active in-process endpoints.
pub fn registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for role in ["code_writer", "code_reviewer", "video_planner", "script_writer"] {
        registry.register(role, AgentEndpoint::active(format!("inproc://{}", role)));
    }
    registry
}

/// Engine policy for the demo: the reviewer is the quality gate, and the
/// writer's output is reshaped into the reviewer's expected input.
pub fn engine_config() -> EngineConfig {
    EngineConfig::from_toml_str(
        r#"
        quality_gate_roles = ["code_reviewer"]

        [[handoffs]]
        from_role = "code_writer"
        to_role = "code_reviewer"
        fields = [
            { from = "code", to = "code_to_review" },
            { from = "language", to = "language" },
        ]
    "#,
    )
    .expect("embedded demo config must parse")
}

/// Canned handlers for every reference role.
pub fn reference_invoker() -> InProcessInvoker {
    let mut invoker = InProcessInvoker::new();

    invoker.register(
        "code_writer",
        Box::new(|input| {
            let task = input["task"].as_str().unwrap_or("do nothing");
            // The "unsafe" task produces code the reviewer will reject.
            let code = if task.contains("at any cost") {
                "fn main() { panic!(\"unhandled\"); }".to_string()
            } else {
                format!("fn main() {{ println!(\"{}\"); }}", task)
            };
            AgentReply::ok(json!({"code": code, "language": "rust"}), 0.92)
        }),
    );

    invoker.register(
        "code_reviewer",
        Box::new(|input| {
            let code = input["code_to_review"].as_str().unwrap_or("");
            if code.contains("panic!") {
                AgentReply::ok(
                    json!({
                        "verdict": "REJECT",
                        "summary": "generated code panics in a production path"
                    }),
                    0.97,
                )
            } else {
                AgentReply::ok(
                    json!({"verdict": "APPROVE", "summary": "code is safe to deploy"}),
                    0.97,
                )
            }
        }),
    );

    invoker.register(
        "video_planner",
        Box::new(|input| {
            let topic = input["topic"].as_str().unwrap_or("untitled");
            AgentReply::ok(
                json!({
                    "topic": topic,
                    "scenes": ["hook", "demonstration", "call to action"]
                }),
                0.9,
            )
        }),
    );

    invoker.register(
        "script_writer",
        Box::new(|input| {
            let scenes = input["scenes"].as_array().map(|s| s.len()).unwrap_or(0);
            AgentReply::ok(
                json!({"script": format!("narration covering {} scenes", scenes)}),
                0.88,
            )
        }),
    );

    invoker
}
