//! Port for the structured run event log.
//!
//! This is separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, while this port records one machine-readable
//! event per stage transition and backend result (JSONL).

use council_domain::{BackendId, RunStatus, Stage};
use serde_json::{Value, json};

/// A structured run event.
pub struct RunEvent {
    /// Event type identifier (e.g. "stage_started", "backend_result").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn stage_started(request_id: &str, stage: Stage, calls: usize) -> Self {
        Self::new(
            "stage_started",
            json!({ "request_id": request_id, "stage": stage.as_str(), "calls": calls }),
        )
    }

    pub fn backend_result(
        request_id: &str,
        stage: Stage,
        backend: &BackendId,
        latency_ms: Option<u64>,
        error: Option<&str>,
    ) -> Self {
        Self::new(
            "backend_result",
            json!({
                "request_id": request_id,
                "stage": stage.as_str(),
                "backend": backend.as_str(),
                "ok": error.is_none(),
                "latency_ms": latency_ms,
                "error": error,
            }),
        )
    }

    pub fn stage_completed(request_id: &str, stage: Stage, status: RunStatus) -> Self {
        Self::new(
            "stage_completed",
            json!({ "request_id": request_id, "stage": stage.as_str(), "status": status.as_str() }),
        )
    }

    pub fn run_deleted(request_id: &str) -> Self {
        Self::new("run_deleted", json!({ "request_id": request_id }))
    }
}

/// Port for logging run events to a structured log.
///
/// `log` is synchronous and infallible; implementations swallow write
/// failures.
pub trait RunEventLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when the event log is disabled.
pub struct NoEventLog;

impl RunEventLogger for NoEventLog {
    fn log(&self, _event: RunEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_result_payload() {
        let backend = BackendId::parse("http://m1").unwrap();
        let event = RunEvent::backend_result("r1", Stage::Review, &backend, None, Some("HTTP 500"));
        assert_eq!(event.event_type, "backend_result");
        assert_eq!(event.payload["stage"], "stage2");
        assert_eq!(event.payload["ok"], false);
        assert_eq!(event.payload["error"], "HTTP 500");
        assert!(event.payload["latency_ms"].is_null());
    }
}
