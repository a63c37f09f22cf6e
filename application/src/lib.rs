//! Application layer for council-orchestrator
//!
//! This crate contains use cases, port definitions, the run store, the
//! heartbeat monitor and application configuration. It depends only on
//! the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{CouncilConfig, HEARTBEAT_FLOOR, HeartbeatConfig};
pub use ports::{
    council_gateway::{CouncilGateway, GatewayError},
    progress::{NoProgress, StageProgress},
    request_id::RequestIdGenerator,
    run_event_logger::{NoEventLog, RunEvent, RunEventLogger},
    run_repository::{RepositoryError, RunRepository},
};
pub use services::{heartbeat::HeartbeatMonitor, run_store::RunStore};
pub use use_cases::check_health::{CheckHealthUseCase, HealthOutput, ProbeResult};
pub use use_cases::run_council::{RunCouncilUseCase, StageError};
pub use use_cases::views::{
    CallStatus, RunView, Stage1Output, Stage2Output, Stage3Output, SynthesisView,
};
