//! Logging infrastructure: the structured run event log.
//!
//! Provides [`JsonlRunEventLogger`], a JSONL file writer that implements
//! the [`RunEventLogger`](council_application::RunEventLogger) port.

mod jsonl_event_log;

pub use jsonl_event_log::JsonlRunEventLogger;
