//! Output views of council runs
//!
//! Views flatten the stored state into the shapes clients consume: stage-1
//! answers in configured member order, reviews per reviewer, and a stage-3
//! summary that is `pending` until the chairman has been called.

use chrono::{DateTime, Utc};
use council_domain::{
    AnswerOutcome, BackendId, RankingEntry, RequestState, ReviewOutcome, RunStatus,
    SynthesisOutcome, TokenUsage, UsedSignals,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
}

/// One member's stage-1 result. Failed members carry empty label and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAnswerView {
    pub anon_id: String,
    pub answer_text: String,
    pub member_url: BackendId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One reviewer's stage-2 result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub reviewer_url: BackendId,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rankings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critiques: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SynthesisView {
    Pending,
    Ok {
        final_answer: String,
        rationale: String,
        used_signals: UsedSignals,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latency_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_usage: Option<TokenUsage>,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage1Output {
    pub request_id: String,
    pub query: String,
    pub answers: Vec<MemberAnswerView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Output {
    pub request_id: String,
    pub reviews: Vec<ReviewView>,
    pub aggregated_ranking: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage3Output {
    pub request_id: String,
    #[serde(flatten)]
    pub result: SynthesisView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage1View {
    pub answers: Vec<MemberAnswerView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2View {
    pub reviews: Vec<ReviewView>,
    pub aggregated_ranking: Vec<RankingEntry>,
}

/// Full view of a stored run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunView {
    pub request_id: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    pub stage1: Stage1View,
    pub stage2: Stage2View,
    pub stage3: SynthesisView,
}

impl RunView {
    pub fn from_state(state: &RequestState, members: &[BackendId]) -> Self {
        Self {
            request_id: state.request_id.clone(),
            query: state.query.content().to_string(),
            created_at: state.created_at,
            status: state.status,
            stage1: Stage1View {
                answers: answer_views(state, members),
            },
            stage2: Stage2View {
                reviews: review_views(state),
                aggregated_ranking: state.stage2.aggregated_ranking.clone(),
            },
            stage3: synthesis_view(state),
        }
    }
}

/// Stage-1 results in configured member order.
///
/// Backends recorded in the run but no longer configured follow, sorted.
pub fn answer_views(state: &RequestState, members: &[BackendId]) -> Vec<MemberAnswerView> {
    let labels: BTreeMap<&BackendId, &str> = state
        .stage1
        .anon_map
        .iter()
        .map(|(label, backend)| (backend, label.as_str()))
        .collect();

    let extra = state
        .stage1
        .answers
        .keys()
        .filter(|backend| !members.contains(backend));

    members
        .iter()
        .chain(extra)
        .filter_map(|member| {
            let outcome = state.stage1.answers.get(member)?;
            Some(match outcome {
                AnswerOutcome::Ok(record) => MemberAnswerView {
                    anon_id: labels.get(member).copied().unwrap_or_default().to_string(),
                    answer_text: record.answer_text.clone(),
                    member_url: member.clone(),
                    latency_ms: record.latency_ms,
                    token_usage: record.token_usage,
                    status: CallStatus::Ok,
                    error: None,
                },
                AnswerOutcome::Error { error } => MemberAnswerView {
                    anon_id: String::new(),
                    answer_text: String::new(),
                    member_url: member.clone(),
                    latency_ms: None,
                    token_usage: None,
                    status: CallStatus::Error,
                    error: Some(error.clone()),
                },
            })
        })
        .collect()
}

/// Stage-2 results ordered by reviewer identity
pub fn review_views(state: &RequestState) -> Vec<ReviewView> {
    state
        .stage2
        .reviews
        .iter()
        .map(|(reviewer, outcome)| match outcome {
            ReviewOutcome::Ok(record) => ReviewView {
                reviewer_url: reviewer.clone(),
                status: CallStatus::Ok,
                rankings: Some(record.rankings.clone()),
                critiques: Some(record.critiques.clone()),
                confidence: Some(record.confidence),
                latency_ms: record.latency_ms,
                token_usage: record.token_usage,
                error: None,
            },
            ReviewOutcome::Error { error } => ReviewView {
                reviewer_url: reviewer.clone(),
                status: CallStatus::Error,
                rankings: None,
                critiques: None,
                confidence: None,
                latency_ms: None,
                token_usage: None,
                error: Some(error.clone()),
            },
        })
        .collect()
}

pub fn synthesis_view(state: &RequestState) -> SynthesisView {
    match state.stage3.as_ref().map(|s| &s.outcome) {
        None => SynthesisView::Pending,
        Some(SynthesisOutcome::Ok(record)) => SynthesisView::Ok {
            final_answer: record.final_answer.clone(),
            rationale: record.rationale.clone(),
            used_signals: record.used_signals.clone(),
            latency_ms: record.latency_ms,
            token_usage: record.token_usage,
        },
        Some(SynthesisOutcome::Error { error }) => SynthesisView::Error {
            error: error.clone(),
        },
    }
}
