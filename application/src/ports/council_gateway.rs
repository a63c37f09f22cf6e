//! Council gateway port
//!
//! Defines how the application layer talks to member and chairman backends.
//! Every call is single-shot and bounded by the caller's timeout.

use async_trait::async_trait;
use council_domain::{
    AnswerRequest, AnswerResponse, BackendId, HealthReport, ReviewRequest, ReviewResponse,
    SynthesisRequest, SynthesisResponse,
};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}{}", .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    Status { status: u16, body: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout(_))
    }
}

/// Gateway to the council's backend services
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CouncilGateway: Send + Sync {
    /// `GET /health` on a member or the chairman
    async fn health(
        &self,
        backend: &BackendId,
        timeout: Duration,
    ) -> Result<HealthReport, GatewayError>;

    /// `POST /answer` on a member
    async fn answer(
        &self,
        member: &BackendId,
        request: &AnswerRequest,
        timeout: Duration,
    ) -> Result<AnswerResponse, GatewayError>;

    /// `POST /review` on a member
    async fn review(
        &self,
        member: &BackendId,
        request: &ReviewRequest,
        timeout: Duration,
    ) -> Result<ReviewResponse, GatewayError>;

    /// `POST /synthesize` on the chairman
    async fn synthesize(
        &self,
        chairman: &BackendId,
        request: &SynthesisRequest,
        timeout: Duration,
    ) -> Result<SynthesisResponse, GatewayError>;
}
