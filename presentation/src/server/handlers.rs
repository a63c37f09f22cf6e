//! Route handlers

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, Path, Query, State};
use council_application::{HealthOutput, RunView, Stage1Output, Stage2Output, Stage3Output};
use council_domain::{HeartbeatSnapshot, RunSummary, StageOptions};
use serde::{Deserialize, Serialize};

const DEFAULT_RUNS_LIMIT: usize = 20;

/// JSON body extractor whose rejections use the API error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct Stage1Body {
    pub query: String,
    #[serde(default)]
    pub options: Option<StageOptions>,
}

#[derive(Debug, Deserialize)]
pub struct StageBody {
    pub request_id: String,
    #[serde(default)]
    pub options: Option<StageOptions>,
}

impl StageBody {
    fn request_id(&self) -> Result<&str, ApiError> {
        if self.request_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest {
                details: "request_id must not be empty".to_string(),
            });
        }
        Ok(&self.request_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct RunsParams {
    pub limit: Option<String>,
}

impl RunsParams {
    /// Unparseable values fall back to the default; the minimum is 1.
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|n| n.max(1) as usize)
            .unwrap_or(DEFAULT_RUNS_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub runs: Vec<RunSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthOutput> {
    Json(state.health.execute().await)
}

pub async fn heartbeat(State(state): State<AppState>) -> Json<HeartbeatSnapshot> {
    Json(state.health.heartbeat())
}

pub async fn stage1(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Stage1Body>,
) -> Result<Json<Stage1Output>, ApiError> {
    let output = state.council.run_stage1(&body.query, body.options).await?;
    Ok(Json(output))
}

pub async fn stage2(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StageBody>,
) -> Result<Json<Stage2Output>, ApiError> {
    let output = state
        .council
        .run_stage2(body.request_id()?, body.options)
        .await?;
    Ok(Json(output))
}

pub async fn stage3(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StageBody>,
) -> Result<Json<Stage3Output>, ApiError> {
    let output = state
        .council
        .run_stage3(body.request_id()?, body.options)
        .await?;
    Ok(Json(output))
}

pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<RunsParams>,
) -> Json<RunsResponse> {
    Json(RunsResponse {
        runs: state.council.list_runs(params.limit()),
    })
}

pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunView>, ApiError> {
    Ok(Json(state.council.get_run(&id)?))
}

pub async fn delete_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    state.council.delete_run(&id);
    Json(DeleteResponse { ok: true })
}

/// In-memory view only; runs evicted by a restart are not loaded here
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunView>, ApiError> {
    Ok(Json(state.council.get_cached_run(&id)?))
}
