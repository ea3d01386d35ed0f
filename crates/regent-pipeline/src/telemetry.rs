//! In-memory implementation of `TelemetrySink`.
//!
//! Keeps all rows in a `Vec` behind a `Mutex`, in append order. The handle
//! returned by `rows()` can be cloned before the sink is boxed into the
//! engine, so tests and the demo can inspect what was recorded.

use std::sync::{Arc, Mutex};

use regent_contracts::{
    error::{RegentError, RegentResult},
    pipeline::StepTelemetry,
};

use crate::traits::TelemetrySink;

/// Append-only in-memory telemetry sink.
pub struct InMemoryTelemetrySink {
    rows: Arc<Mutex<Vec<StepTelemetry>>>,
}

impl InMemoryTelemetrySink {
    pub fn new() -> Self {
        Self { rows: Arc::new(Mutex::new(Vec::new())) }
    }

    /// A shared handle to the recorded rows.
    pub fn rows(&self) -> Arc<Mutex<Vec<StepTelemetry>>> {
        self.rows.clone()
    }
}

impl Default for InMemoryTelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for InMemoryTelemetrySink {
    fn record(&self, row: StepTelemetry) -> RegentResult<()> {
        let mut rows = self.rows.lock().map_err(|e| RegentError::TelemetryWriteFailed {
            reason: format!("telemetry lock poisoned: {}", e),
        })?;
        rows.push(row);
        Ok(())
    }
}
