//! The pipeline engine: the sequential, policy-halting step runner.
//!
//! The engine enforces the execution model:
//!
//!   Certify graph → [per step: transform → resolve → invoke → verify
//!   output → record telemetry → evaluate halting policy] → next payload
//!
//! Two invariants are absolute:
//!
//! - every attempted step produces exactly one telemetry row, recorded
//!   before the halt decision propagates;
//! - a policy halt (`HaltedRejected`) is never conflated with an execution
//!   failure (`HaltedError`).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use regent_contracts::{
    error::{RegentError, RegentResult},
    graph::GraphReport,
    pipeline::{AgentReply, PipelineOutcome, PipelineRun, RunStatus, StepTelemetry, TraceId},
    spec::AgentSpec,
};
use regent_graph::can_hand_off;
use regent_store::{SpecCache, SpecStore};

use crate::{
    config::EngineConfig,
    handoff::HandoffMap,
    output::verify_output,
    registry::AgentRegistry,
    traits::{AgentInvoker, TelemetrySink},
};

/// The pipeline engine.
///
/// Construct one per service instance; `execute` may be called repeatedly.
/// Spec reads go through a versioned cache without locking — a mutation
/// committed mid-stream takes effect on the next run, never mid-run.
pub struct PipelineEngine {
    store: Arc<dyn SpecStore>,
    invoker: Box<dyn AgentInvoker>,
    telemetry: Box<dyn TelemetrySink>,
    registry: AgentRegistry,
    handoffs: HandoffMap,
    config: EngineConfig,
    cache: Mutex<SpecCache>,
    /// Store version at the last healthy graph certification. A run whose
    /// store version matches reuses the certification instead of
    /// re-walking the graph.
    certified_at: Mutex<Option<u64>>,
}

impl PipelineEngine {
    /// Create an engine over the given collaborators.
    ///
    /// Declarative handoff transforms from `config.handoffs` are installed;
    /// custom closures can be added afterwards via `register_handoff`.
    pub fn new(
        store: Arc<dyn SpecStore>,
        invoker: Box<dyn AgentInvoker>,
        telemetry: Box<dyn TelemetrySink>,
        registry: AgentRegistry,
        config: EngineConfig,
    ) -> Self {
        let handoffs = HandoffMap::from_decls(&config.handoffs);
        Self {
            store,
            invoker,
            telemetry,
            registry,
            handoffs,
            config,
            cache: Mutex::new(SpecCache::new()),
            certified_at: Mutex::new(None),
        }
    }

    /// Register a custom handoff transform for `(from_role, to_role)`.
    pub fn register_handoff(
        &mut self,
        from_role: &str,
        to_role: &str,
        f: Box<dyn Fn(&Value) -> Value + Send + Sync>,
    ) {
        self.handoffs.register(from_role, to_role, f);
    }

    /// Execute `steps` with a freshly generated trace id.
    pub fn execute(&self, steps: Vec<String>, initial_payload: Value) -> RegentResult<PipelineOutcome> {
        self.execute_traced(TraceId::new(), steps, initial_payload)
    }

    /// Execute `steps` under a caller-supplied trace id.
    ///
    /// Returns `Err` only for caller mistakes (empty step list) and
    /// infrastructure failures on the read path. Everything that happens
    /// during execution — including every halt — is expressed in the
    /// returned `PipelineOutcome`, with one telemetry row per attempted
    /// step already recorded.
    pub fn execute_traced(
        &self,
        trace_id: TraceId,
        steps: Vec<String>,
        initial_payload: Value,
    ) -> RegentResult<PipelineOutcome> {
        if steps.is_empty() {
            return Err(RegentError::EmptyPipeline);
        }

        let mut run = PipelineRun {
            trace_id,
            steps,
            initial_payload,
            status: RunStatus::Running,
            started_at: Utc::now(),
        };

        debug!(trace_id = %run.trace_id, steps = run.steps.len(), "pipeline starting");

        let specs = {
            let mut cache = self.cache.lock().map_err(|e| RegentError::StoreWriteFailed {
                reason: format!("spec cache lock poisoned: {}", e),
            })?;
            cache.read(self.store.as_ref())?.clone()
        };

        // ── Preconditions ────────────────────────────────────────────────────
        //
        // All failures are collected so the caller sees every problem with
        // the submitted step list at once.
        let mut errors = Vec::new();

        for role in &run.steps {
            match specs.get(role) {
                Some(spec) if spec.is_active => {}
                _ => errors.push(format!("role '{}' is not an active spec", role)),
            }
        }

        let report = self.certify_graph(&specs);
        if !report.is_healthy {
            errors.extend(report.errors);
        }

        for pair in run.steps.windows(2) {
            if specs.contains_key(&pair[0])
                && specs.contains_key(&pair[1])
                && !can_hand_off(&specs, &pair[0], &pair[1])
            {
                errors.push(format!(
                    "invalid handoff: {} cannot hand off to {}",
                    pair[0], pair[1]
                ));
            }
        }

        if !errors.is_empty() {
            let reason = errors.join("; ");
            warn!(trace_id = %run.trace_id, %reason, "pipeline rejected before execution");
            run.status = RunStatus::HaltedRejected;
            return Ok(Self::outcome(&run, Vec::new(), 0, Some(reason)));
        }

        // ── Step loop ────────────────────────────────────────────────────────
        let mut results: Vec<Value> = Vec::new();
        let mut payload = run.initial_payload.clone();

        for (i, role) in run.steps.iter().enumerate() {
            let spec = &specs[role];
            let input = if i == 0 {
                payload.clone()
            } else {
                self.handoffs.apply(&run.steps[i - 1], role, &payload)
            };
            let step_started = Utc::now();

            debug!(trace_id = %run.trace_id, step = i, role = %role, "pipeline step starting");

            let invoke_result = match self.registry.resolve(role) {
                Some(endpoint) => {
                    debug!(role = %role, address = %endpoint.address, "endpoint resolved");
                    self.invoker.invoke(role, &input, self.config.step_timeout())
                }
                None => Err(RegentError::InvokeFailed {
                    role: role.clone(),
                    reason: "no active endpoint in registry".to_string(),
                }),
            };

            let reply = match invoke_result {
                Ok(reply) => reply,
                Err(e) => {
                    let reason = e.to_string();
                    warn!(trace_id = %run.trace_id, step = i, role = %role, %reason, "agent call failed");
                    self.record_step(&run, i, role, &input, None, false, None, Some(reason.as_str()), step_started);
                    run.status = RunStatus::HaltedError;
                    return Ok(Self::outcome(&run, results, i, Some(reason)));
                }
            };

            if !reply.success {
                let reason = reply
                    .error
                    .clone()
                    .unwrap_or_else(|| "agent reported failure without detail".to_string());
                warn!(trace_id = %run.trace_id, step = i, role = %role, %reason, "agent reported failure");
                self.record_step(&run, i, role, &input, None, false, reply.confidence, Some(reason.as_str()), step_started);
                run.status = RunStatus::HaltedError;
                return Ok(Self::outcome(&run, results, i, Some(reason)));
            }

            let violations = verify_output(role, &spec.output_schema, &reply.output);
            if !violations.is_empty() {
                // A reply that breaks the role's declared schema is a
                // malformed agent response, not a policy decision.
                let reason = violations.join("; ");
                self.record_step(
                    &run, i, role, &input,
                    Some(&reply.output), false, reply.confidence, Some(reason.as_str()), step_started,
                );
                run.status = RunStatus::HaltedError;
                return Ok(Self::outcome(&run, results, i, Some(reason)));
            }

            // The step is attempted and well-formed: its telemetry row is
            // durable before any halt decision propagates.
            self.record_step(
                &run, i, role, &input,
                Some(&reply.output), true, reply.confidence, None, step_started,
            );
            results.push(reply.output.clone());

            // ── Halting policy, in precedence order ──────────────────────────

            if self.config.is_quality_gate(role) && self.is_rejection(&reply) {
                let reason = format!("quality gate '{}' returned rejection verdict", role);
                info!(trace_id = %run.trace_id, step = i, role = %role, "pipeline halted by quality gate");
                run.status = RunStatus::HaltedRejected;
                return Ok(Self::outcome(&run, results, i + 1, Some(reason)));
            }

            if let Some(confidence) = reply.confidence {
                if confidence < self.config.confidence_floor
                    && !self.config.review_remains(&run.steps[i + 1..])
                {
                    let reason = format!(
                        "confidence {:.2} below floor {:.2} with no review step remaining",
                        confidence, self.config.confidence_floor
                    );
                    info!(trace_id = %run.trace_id, step = i, role = %role, %reason, "pipeline halted on low confidence");
                    run.status = RunStatus::HaltedRejected;
                    return Ok(Self::outcome(&run, results, i + 1, Some(reason)));
                }
            }

            payload = reply.output;
        }

        info!(trace_id = %run.trace_id, steps = run.steps.len(), "pipeline completed");
        run.status = RunStatus::Completed;
        let completed = run.steps.len();
        Ok(Self::outcome(&run, results, completed, None))
    }

    /// Certify the graph, reusing the last healthy certification when the
    /// store version is unchanged since it was taken.
    fn certify_graph(&self, specs: &BTreeMap<String, AgentSpec>) -> GraphReport {
        let current = self.store.store_version();

        if let Ok(certified) = self.certified_at.lock() {
            if *certified == Some(current) {
                debug!(store_version = current, "reusing graph certification");
                return GraphReport::healthy();
            }
        }

        let report = regent_graph::validate(specs);
        if report.is_healthy {
            if let Ok(mut certified) = self.certified_at.lock() {
                *certified = Some(current);
            }
        }
        report
    }

    /// True when the reply's verdict field carries the rejection value.
    fn is_rejection(&self, reply: &AgentReply) -> bool {
        reply
            .output
            .get(&self.config.verdict_field)
            .and_then(Value::as_str)
            == Some(self.config.rejection_value.as_str())
    }

    /// Record one telemetry row. A sink failure is logged and swallowed —
    /// telemetry must never halt a run.
    #[allow(clippy::too_many_arguments)]
    fn record_step(
        &self,
        run: &PipelineRun,
        step_index: usize,
        role: &str,
        input: &Value,
        output: Option<&Value>,
        success: bool,
        confidence: Option<f64>,
        error: Option<&str>,
        step_started: chrono::DateTime<Utc>,
    ) {
        let row = StepTelemetry {
            trace_id: run.trace_id.clone(),
            step_index,
            role: role.to_string(),
            input: input.clone(),
            output: output.cloned(),
            success,
            confidence,
            error: error.map(str::to_string),
            duration_ms: (Utc::now() - step_started).num_milliseconds(),
            memory_used: None,
            retrieval_used: None,
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.telemetry.record(row) {
            warn!(trace_id = %run.trace_id, step = step_index, error = %e, "telemetry write failed; run continues");
        }
    }

    fn outcome(
        run: &PipelineRun,
        results: Vec<Value>,
        steps_completed: usize,
        halt_reason: Option<String>,
    ) -> PipelineOutcome {
        PipelineOutcome {
            trace_id: run.trace_id.clone(),
            status: run.status,
            results,
            steps_completed,
            halt_reason,
            duration_ms: (Utc::now() - run.started_at).num_milliseconds(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
