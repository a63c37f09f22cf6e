//! Long-lived application services owned by the composition root.

pub mod heartbeat;
pub mod run_store;
