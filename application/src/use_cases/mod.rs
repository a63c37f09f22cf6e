//! Use cases (application services)
//!
//! - [`run_council`]: the three council stages and run management
//! - [`check_health`]: live backend probes plus the heartbeat snapshot
//! - [`views`]: client-facing shapes of stored runs

pub mod check_health;
pub mod run_council;
pub mod views;
