//! In-process agent transport.
//!
//! The reference `AgentInvoker` implementation: each role maps to a plain
//! function registered at startup. Used by the demo and by tests; the HTTP
//! transport lives outside this repository behind the same trait.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use regent_contracts::{
    error::{RegentError, RegentResult},
    pipeline::AgentReply,
};

use crate::traits::AgentInvoker;

/// A registered in-process agent handler.
///
/// Receives the (transformed) step input and returns the agent's reply.
pub type AgentHandlerFn = Box<dyn Fn(&serde_json::Value) -> AgentReply + Send + Sync>;

/// An `AgentInvoker` that dispatches to handlers registered by name.
pub struct InProcessInvoker {
    handlers: HashMap<String, AgentHandlerFn>,
}

impl InProcessInvoker {
    /// Create an invoker with no handlers registered.
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Register a handler under `role`. Registering the same role twice
    /// replaces the previous handler.
    pub fn register(&mut self, role: impl Into<String>, handler: AgentHandlerFn) {
        self.handlers.insert(role.into(), handler);
    }
}

impl Default for InProcessInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentInvoker for InProcessInvoker {
    /// Dispatch to the handler registered for `role`.
    ///
    /// In-process handlers complete synchronously, so `timeout` is not
    /// enforced here — it bounds real network transports.
    fn invoke(
        &self,
        role: &str,
        input: &serde_json::Value,
        _timeout: Duration,
    ) -> RegentResult<AgentReply> {
        let handler = self.handlers.get(role).ok_or_else(|| RegentError::InvokeFailed {
            role: role.to_string(),
            reason: "no in-process handler registered".to_string(),
        })?;

        debug!(role = %role, "dispatching in-process agent call");
        Ok(handler(input))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_handler_is_dispatched() {
        let mut invoker = InProcessInvoker::new();
        invoker.register(
            "echo",
            Box::new(|input| AgentReply::ok(input.clone(), 1.0)),
        );

        let input = serde_json::json!({"task": "ping"});
        let reply = invoker.invoke("echo", &input, Duration::from_secs(30)).unwrap();
        assert!(reply.success);
        assert_eq!(reply.output, input);
    }

    #[test]
    fn unregistered_role_is_a_transport_failure() {
        let invoker = InProcessInvoker::new();
        let result = invoker.invoke("ghost", &serde_json::Value::Null, Duration::from_secs(30));
        assert!(matches!(result, Err(RegentError::InvokeFailed { .. })));
    }
}
