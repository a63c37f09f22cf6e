//! HTTP adapter for member and chairman backends
//!
//! [`BackendClient`] performs one bounded JSON request and classifies every
//! failure into a [`GatewayError`](council_application::GatewayError).
//! [`HttpCouncilGateway`] maps the council operations onto backend
//! endpoints.

mod client;
mod gateway;

pub use client::BackendClient;
pub use gateway::HttpCouncilGateway;
