//! Run Council use case
//!
//! Drives the three externally triggered stages of a council run. Each
//! stage reads the stored run, fans out to its backends concurrently,
//! waits for every call, then replaces the stored run as a whole.

use crate::config::CouncilConfig;
use crate::ports::council_gateway::{CouncilGateway, GatewayError};
use crate::ports::progress::{NoProgress, StageProgress};
use crate::ports::request_id::RequestIdGenerator;
use crate::ports::run_event_logger::{NoEventLog, RunEvent, RunEventLogger};
use crate::services::run_store::RunStore;
use crate::use_cases::views::{
    RunView, Stage1Output, Stage2Output, Stage3Output, answer_views, review_views, synthesis_view,
};
use chrono::Utc;
use council_domain::{
    AnswerOutcome, AnswerRecord, AnswerRequest, Anonymization, BackendId, Query, RequestState,
    ReviewOutcome, ReviewRecord, ReviewRequest, RunSummary, Stage, Stage3State, StageOptions,
    SynthesisOutcome, SynthesisRecord, SynthesisRequest, aggregate_rankings,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Errors that abort a stage before any state is written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request not found")]
    NotFound(String),

    #[error("Not enough answers to run {}: need {required}, have {found}", .stage.as_str())]
    NotEnoughAnswers {
        stage: Stage,
        required: usize,
        found: usize,
    },

    #[error("Stage2 results are required for stage3")]
    RankingRequired,
}

impl StageError {
    /// Whether the caller asked for something the run cannot do yet
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StageError::NotEnoughAnswers { .. } | StageError::RankingRequired
        )
    }
}

/// Use case for running council stages
pub struct RunCouncilUseCase {
    gateway: Arc<dyn CouncilGateway>,
    store: Arc<RunStore>,
    ids: Arc<dyn RequestIdGenerator>,
    config: CouncilConfig,
    progress: Arc<dyn StageProgress>,
    events: Arc<dyn RunEventLogger>,
}

impl RunCouncilUseCase {
    pub fn new(
        gateway: Arc<dyn CouncilGateway>,
        store: Arc<RunStore>,
        ids: Arc<dyn RequestIdGenerator>,
        config: CouncilConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            ids,
            config,
            progress: Arc::new(NoProgress),
            events: Arc::new(NoEventLog),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn StageProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn RunEventLogger>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Stage 1: create a run and collect an answer from every member.
    ///
    /// Returns even when fewer than two members answered; the run's status
    /// records whether any answer arrived.
    pub async fn run_stage1(
        &self,
        query: &str,
        options: Option<StageOptions>,
    ) -> Result<Stage1Output, StageError> {
        let query = Query::new(query).map_err(|e| StageError::InvalidRequest(e.to_string()))?;
        let request_id = self.ids.next_id();
        let mut state = self.store.create(request_id.clone(), query, Utc::now());

        let members = self.config.members();
        info!(
            "Stage 1 [{}]: collecting answers from {} members",
            request_id,
            members.len()
        );
        self.begin(&request_id, Stage::Answer, members.len());

        let request = AnswerRequest {
            request_id: request_id.clone(),
            query: state.query.content().to_string(),
            options,
        };

        let mut join_set = JoinSet::new();
        for member in members {
            let gateway = Arc::clone(&self.gateway);
            let member = member.clone();
            let request = request.clone();
            let timeout = self.config.timeout();

            join_set.spawn(async move {
                let started = Instant::now();
                let result = gateway.answer(&member, &request, timeout).await;
                let measured = elapsed_ms(started);
                let outcome = match result {
                    Ok(response) => Ok(AnswerRecord {
                        latency_ms: Some(response.reported_latency_ms().unwrap_or(measured)),
                        answer_text: response.answer_text,
                        token_usage: response.token_usage,
                    }),
                    Err(e) => Err(e),
                };
                (member, outcome)
            });
        }

        let mut outcomes = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((member, Ok(record))) => {
                    info!("Member {} answered", member);
                    self.record_call(&request_id, Stage::Answer, &member, record.latency_ms, None);
                    outcomes.insert(member, AnswerOutcome::Ok(record));
                }
                Ok((member, Err(e))) => {
                    warn!("Member {} failed to answer: {}", member, e);
                    self.record_call(&request_id, Stage::Answer, &member, None, Some(&e));
                    outcomes.insert(
                        member,
                        AnswerOutcome::Error {
                            error: e.to_string(),
                        },
                    );
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }
        fill_missing(&mut outcomes, members, |error| AnswerOutcome::Error { error });

        let anonymization = Anonymization::assign(outcomes.iter().filter_map(|(member, o)| {
            o.answer_text().map(|text| (member.clone(), text.to_string()))
        }));
        state.record_answers(outcomes, &anonymization);
        self.store.replace(state.clone());
        self.finish(&state, Stage::Answer);

        Ok(Stage1Output {
            request_id,
            query: state.query.content().to_string(),
            answers: answer_views(&state, members),
        })
    }

    /// Stage 2: every member that answered reviews its peers' answers.
    ///
    /// Requires at least two anonymized answers; otherwise the run is left
    /// untouched. The ranking is aggregated over successful reviews only.
    pub async fn run_stage2(
        &self,
        request_id: &str,
        options: Option<StageOptions>,
    ) -> Result<Stage2Output, StageError> {
        let mut state = self.load(request_id)?;
        let anonymization = state.anonymization();
        if anonymization.len() < 2 {
            return Err(StageError::NotEnoughAnswers {
                stage: Stage::Review,
                required: 2,
                found: anonymization.len(),
            });
        }

        info!(
            "Stage 2 [{}]: collecting {} peer reviews",
            request_id,
            anonymization.len()
        );
        self.begin(request_id, Stage::Review, anonymization.len());

        let mut join_set = JoinSet::new();
        for answer in anonymization.answers() {
            let gateway = Arc::clone(&self.gateway);
            let reviewer = answer.backend.clone();
            let request = ReviewRequest {
                request_id: request_id.to_string(),
                query: state.query.content().to_string(),
                peer_answers: anonymization.peer_view(&reviewer),
                options,
            };
            let timeout = self.config.timeout();

            join_set.spawn(async move {
                let started = Instant::now();
                let result = gateway.review(&reviewer, &request, timeout).await;
                let measured = elapsed_ms(started);
                let outcome = match result {
                    Ok(response) => Ok(ReviewRecord {
                        latency_ms: Some(response.reported_latency_ms().unwrap_or(measured)),
                        rankings: response.rankings,
                        critiques: response.critiques,
                        confidence: response.confidence,
                        token_usage: response.token_usage,
                    }),
                    Err(e) => Err(e),
                };
                (reviewer, outcome)
            });
        }

        let mut reviews = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((reviewer, Ok(record))) => {
                    info!("Member {} completed review", reviewer);
                    self.record_call(request_id, Stage::Review, &reviewer, record.latency_ms, None);
                    reviews.insert(reviewer, ReviewOutcome::Ok(record));
                }
                Ok((reviewer, Err(e))) => {
                    warn!("Member {} review failed: {}", reviewer, e);
                    self.record_call(request_id, Stage::Review, &reviewer, None, Some(&e));
                    reviews.insert(
                        reviewer,
                        ReviewOutcome::Error {
                            error: e.to_string(),
                        },
                    );
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }
        let reviewers: Vec<BackendId> = anonymization
            .answers()
            .iter()
            .map(|a| a.backend.clone())
            .collect();
        fill_missing(&mut reviews, &reviewers, |error| ReviewOutcome::Error { error });

        let rankings: Vec<&[String]> = reviews
            .values()
            .filter_map(|r| r.as_ok().map(|record| record.rankings.as_slice()))
            .collect();
        let aggregated = aggregate_rankings(&rankings, &anonymization.labels());

        state.record_reviews(reviews, aggregated.clone());
        self.store.replace(state.clone());
        self.finish(&state, Stage::Review);

        Ok(Stage2Output {
            request_id: request_id.to_string(),
            reviews: review_views(&state),
            aggregated_ranking: aggregated,
        })
    }

    /// Stage 3: the chairman synthesizes a final answer.
    ///
    /// A chairman failure is recorded in the run and returned as an
    /// `error` result, not as a [`StageError`].
    pub async fn run_stage3(
        &self,
        request_id: &str,
        options: Option<StageOptions>,
    ) -> Result<Stage3Output, StageError> {
        let mut state = self.load(request_id)?;
        let anonymization = state.anonymization();
        if anonymization.is_empty() {
            return Err(StageError::NotEnoughAnswers {
                stage: Stage::Synthesis,
                required: 1,
                found: 0,
            });
        }
        if state.stage2.aggregated_ranking.is_empty() {
            return Err(StageError::RankingRequired);
        }

        let chairman = self.config.chairman().clone();
        info!("Stage 3 [{}]: synthesizing with {}", request_id, chairman);
        self.begin(request_id, Stage::Synthesis, 1);

        let request = SynthesisRequest {
            request_id: request_id.to_string(),
            query: state.query.content().to_string(),
            answers: anonymization.public_view(),
            reviews: state.chairman_reviews(),
            aggregated_ranking: state.stage2.aggregated_ranking.clone(),
            options,
        };

        let started = Instant::now();
        let result = self
            .gateway
            .synthesize(&chairman, &request, self.config.timeout())
            .await;
        let measured = elapsed_ms(started);

        let outcome = match result {
            Ok(response) => {
                let latency_ms = response.reported_latency_ms().unwrap_or(measured);
                self.record_call(request_id, Stage::Synthesis, &chairman, Some(latency_ms), None);
                SynthesisOutcome::Ok(SynthesisRecord {
                    chairman_id: response.chairman_id,
                    final_answer: response.final_answer,
                    rationale: response.rationale,
                    used_signals: response.used_signals,
                    latency_ms: Some(latency_ms),
                    token_usage: response.token_usage,
                })
            }
            Err(e) => {
                warn!("Chairman {} failed: {}", chairman, e);
                self.record_call(request_id, Stage::Synthesis, &chairman, None, Some(&e));
                SynthesisOutcome::Error {
                    error: e.to_string(),
                }
            }
        };

        state.record_synthesis(Stage3State {
            chairman_url: chairman,
            outcome,
        });
        self.store.replace(state.clone());
        self.finish(&state, Stage::Synthesis);

        Ok(Stage3Output {
            request_id: request_id.to_string(),
            result: synthesis_view(&state),
        })
    }

    /// Full view of a run, loading it from durable storage if needed
    pub fn get_run(&self, request_id: &str) -> Result<RunView, StageError> {
        let state = self.load(request_id)?;
        Ok(RunView::from_state(&state, self.config.members()))
    }

    /// Full view of a run held in memory
    pub fn get_cached_run(&self, request_id: &str) -> Result<RunView, StageError> {
        let state = self
            .store
            .get_cached(request_id)
            .ok_or_else(|| StageError::NotFound(request_id.to_string()))?;
        Ok(RunView::from_state(&state, self.config.members()))
    }

    /// Most recent runs first; `limit` is at least 1
    pub fn list_runs(&self, limit: usize) -> Vec<RunSummary> {
        self.store.list(limit.max(1))
    }

    /// Delete a run from memory and durable storage. Unknown ids are ignored.
    pub fn delete_run(&self, request_id: &str) {
        self.store.delete(request_id);
        self.events.log(RunEvent::run_deleted(request_id));
        info!("Deleted run {}", request_id);
    }

    fn load(&self, request_id: &str) -> Result<RequestState, StageError> {
        self.store
            .get(request_id)
            .ok_or_else(|| StageError::NotFound(request_id.to_string()))
    }

    fn begin(&self, request_id: &str, stage: Stage, calls: usize) {
        self.progress.on_stage_start(stage, calls);
        self.events
            .log(RunEvent::stage_started(request_id, stage, calls));
    }

    fn record_call(
        &self,
        request_id: &str,
        stage: Stage,
        backend: &BackendId,
        latency_ms: Option<u64>,
        error: Option<&GatewayError>,
    ) {
        self.progress
            .on_call_complete(stage, backend, error.is_none());
        let message = error.map(|e| e.to_string());
        self.events.log(RunEvent::backend_result(
            request_id,
            stage,
            backend,
            latency_ms,
            message.as_deref(),
        ));
    }

    fn finish(&self, state: &RequestState, stage: Stage) {
        self.progress.on_stage_complete(stage);
        self.events.log(RunEvent::stage_completed(
            &state.request_id,
            stage,
            state.status,
        ));
        info!(
            "{} [{}] finished: {}",
            stage.display_name(),
            state.request_id,
            state.status
        );
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Record an error for every backend whose task never reported back
fn fill_missing<T>(
    outcomes: &mut BTreeMap<BackendId, T>,
    backends: &[BackendId],
    error: impl Fn(String) -> T,
) {
    for backend in backends {
        if !outcomes.contains_key(backend) {
            outcomes.insert(backend.clone(), error("task failed".to_string()));
        }
    }
}
