//! In-process fakes for the application ports

use crate::ports::council_gateway::{CouncilGateway, GatewayError};
use crate::ports::request_id::RequestIdGenerator;
use crate::ports::run_repository::{RepositoryError, RunRepository};
use async_trait::async_trait;
use council_domain::{
    AnswerRequest, AnswerResponse, BackendId, HealthReport, RequestState, ReviewRequest,
    ReviewResponse, RunSummary, SynthesisRequest, SynthesisResponse, UsedSignals,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryRepository {
    runs: Mutex<HashMap<String, RequestState>>,
    failing: bool,
}

impl MemoryRepository {
    /// Repository whose every call fails
    pub fn failing() -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
            failing: true,
        }
    }

    pub fn stored(&self, request_id: &str) -> Option<RequestState> {
        self.runs.lock().get(request_id).cloned()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing {
            return Err(RepositoryError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

impl RunRepository for MemoryRepository {
    fn save(&self, state: &RequestState) -> Result<(), RepositoryError> {
        self.check()?;
        self.runs
            .lock()
            .insert(state.request_id.clone(), state.clone());
        Ok(())
    }

    fn load(&self, request_id: &str) -> Result<Option<RequestState>, RepositoryError> {
        self.check()?;
        Ok(self.stored(request_id))
    }

    fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RepositoryError> {
        self.check()?;
        let mut runs: Vec<RunSummary> = self.runs.lock().values().map(|s| s.summary()).collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs.truncate(limit);
        Ok(runs)
    }

    fn delete(&self, request_id: &str) -> Result<(), RepositoryError> {
        self.check()?;
        self.runs.lock().remove(request_id);
        Ok(())
    }
}

/// Gateway with per-backend scripted outcomes.
///
/// Unscripted members answer `"answer from <url>"` and rank the peers they
/// are shown in order; the chairman synthesizes `"final"`.
#[derive(Default)]
pub struct ScriptedGateway {
    unhealthy: Mutex<HashSet<BackendId>>,
    health_delay: Mutex<Option<Duration>>,
    health_calls: AtomicUsize,
    panic_next_health: AtomicBool,
    answers: Mutex<HashMap<BackendId, Result<AnswerResponse, GatewayError>>>,
    reviews: Mutex<HashMap<BackendId, Result<ReviewResponse, GatewayError>>>,
    synthesis: Mutex<Option<Result<SynthesisResponse, GatewayError>>>,
    review_requests: Mutex<BTreeMap<BackendId, ReviewRequest>>,
    synthesis_requests: Mutex<Vec<SynthesisRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, backend: &BackendId, healthy: bool) {
        let mut unhealthy = self.unhealthy.lock();
        if healthy {
            unhealthy.remove(backend);
        } else {
            unhealthy.insert(backend.clone());
        }
    }

    pub fn set_health_delay(&self, delay: Duration) {
        *self.health_delay.lock() = Some(delay);
    }

    /// The next `health` call panics instead of answering.
    pub fn panic_next_health(&self) {
        self.panic_next_health.store(true, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn fail_answer(&self, member: &BackendId, error: GatewayError) {
        self.answers.lock().insert(member.clone(), Err(error));
    }

    pub fn script_answer(&self, member: &BackendId, response: AnswerResponse) {
        self.answers.lock().insert(member.clone(), Ok(response));
    }

    pub fn fail_review(&self, member: &BackendId, error: GatewayError) {
        self.reviews.lock().insert(member.clone(), Err(error));
    }

    pub fn script_review(&self, member: &BackendId, response: ReviewResponse) {
        self.reviews.lock().insert(member.clone(), Ok(response));
    }

    pub fn fail_synthesis(&self, error: GatewayError) {
        *self.synthesis.lock() = Some(Err(error));
    }

    pub fn review_requests(&self) -> BTreeMap<BackendId, ReviewRequest> {
        self.review_requests.lock().clone()
    }

    pub fn synthesis_requests(&self) -> Vec<SynthesisRequest> {
        self.synthesis_requests.lock().clone()
    }
}

#[async_trait]
impl CouncilGateway for ScriptedGateway {
    async fn health(
        &self,
        backend: &BackendId,
        _timeout: Duration,
    ) -> Result<HealthReport, GatewayError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_next_health.swap(false, Ordering::SeqCst) {
            panic!("scripted health panic for {}", backend);
        }
        let delay = *self.health_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unhealthy.lock().contains(backend) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }
        Ok(HealthReport {
            ok: true,
            id: Some(backend.to_string()),
            model_name: Some("test-model".to_string()),
            backend_url: None,
            timestamp: None,
            error: None,
        })
    }

    async fn answer(
        &self,
        member: &BackendId,
        _request: &AnswerRequest,
        _timeout: Duration,
    ) -> Result<AnswerResponse, GatewayError> {
        if let Some(scripted) = self.answers.lock().get(member) {
            return scripted.clone();
        }
        Ok(AnswerResponse {
            member_id: member.to_string(),
            answer_text: format!("answer from {}", member),
            latency_ms: Some(5.0),
            token_usage: None,
        })
    }

    async fn review(
        &self,
        member: &BackendId,
        request: &ReviewRequest,
        _timeout: Duration,
    ) -> Result<ReviewResponse, GatewayError> {
        self.review_requests
            .lock()
            .insert(member.clone(), request.clone());
        if let Some(scripted) = self.reviews.lock().get(member) {
            return scripted.clone();
        }
        Ok(ReviewResponse {
            member_id: member.to_string(),
            rankings: request
                .peer_answers
                .iter()
                .map(|p| p.anon_id.clone())
                .collect(),
            critiques: BTreeMap::new(),
            confidence: 0.7,
            latency_ms: None,
            token_usage: None,
        })
    }

    async fn synthesize(
        &self,
        chairman: &BackendId,
        request: &SynthesisRequest,
        _timeout: Duration,
    ) -> Result<SynthesisResponse, GatewayError> {
        self.synthesis_requests.lock().push(request.clone());
        if let Some(scripted) = self.synthesis.lock().as_ref() {
            return scripted.clone();
        }
        Ok(SynthesisResponse {
            chairman_id: chairman.to_string(),
            final_answer: "final".to_string(),
            rationale: "best ranked".to_string(),
            used_signals: UsedSignals {
                top_ranked: request
                    .aggregated_ranking
                    .first()
                    .map(|e| vec![e.anon_id.clone()])
                    .unwrap_or_default(),
                ..Default::default()
            },
            latency_ms: Some(12.0),
            token_usage: None,
        })
    }
}

/// Sequential ids `run-1`, `run-2`, ...
#[derive(Default)]
pub struct SequentialIds(AtomicUsize);

impl RequestIdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("run-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
