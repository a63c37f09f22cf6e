//! Infrastructure layer for council-orchestrator
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP backend gateway, SQLite run
//! storage, the JSONL event log, and configuration file loading.

pub mod backend;
pub mod config;
pub mod ids;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use backend::{BackendClient, HttpCouncilGateway};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileHeartbeatConfig,
    FileLoggingConfig, FilePersistenceConfig, FileServerConfig,
};
pub use ids::UuidRequestIds;
pub use logging::JsonlRunEventLogger;
pub use persistence::SqliteRunRepository;
