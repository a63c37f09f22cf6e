//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod council_gateway;
pub mod progress;
pub mod request_id;
pub mod run_event_logger;
pub mod run_repository;
