//! Council gateway over HTTP

use super::client::BackendClient;
use async_trait::async_trait;
use council_application::{CouncilGateway, GatewayError};
use council_domain::{
    AnswerRequest, AnswerResponse, BackendId, HealthReport, ReviewRequest, ReviewResponse,
    SynthesisRequest, SynthesisResponse,
};
use std::time::Duration;
use tracing::debug;

/// Talks to members and the chairman over their JSON endpoints.
#[derive(Clone)]
pub struct HttpCouncilGateway {
    client: BackendClient,
}

impl HttpCouncilGateway {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CouncilGateway for HttpCouncilGateway {
    async fn health(
        &self,
        backend: &BackendId,
        timeout: Duration,
    ) -> Result<HealthReport, GatewayError> {
        self.client.get(&backend.endpoint("/health"), timeout).await
    }

    async fn answer(
        &self,
        member: &BackendId,
        request: &AnswerRequest,
        timeout: Duration,
    ) -> Result<AnswerResponse, GatewayError> {
        debug!(member = %member, request_id = %request.request_id, "requesting answer");
        self.client
            .post(&member.endpoint("/answer"), request, timeout)
            .await
    }

    async fn review(
        &self,
        member: &BackendId,
        request: &ReviewRequest,
        timeout: Duration,
    ) -> Result<ReviewResponse, GatewayError> {
        debug!(
            member = %member,
            request_id = %request.request_id,
            peers = request.peer_answers.len(),
            "requesting review"
        );
        self.client
            .post(&member.endpoint("/review"), request, timeout)
            .await
    }

    async fn synthesize(
        &self,
        chairman: &BackendId,
        request: &SynthesisRequest,
        timeout: Duration,
    ) -> Result<SynthesisResponse, GatewayError> {
        debug!(chairman = %chairman, request_id = %request.request_id, "requesting synthesis");
        self.client
            .post(&chairman.endpoint("/synthesize"), request, timeout)
            .await
    }
}
