use super::member::reported_latency;
use super::{PeerAnswer, ResponseContract, StageOptions, TokenUsage};
use crate::council::ranking::RankingEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A successful peer review as forwarded to the chairman
///
/// The reviewer is identified only by its own anonymous label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairmanReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_anon: Option<String>,
    pub rankings: Vec<String>,
    pub critiques: BTreeMap<String, String>,
    pub confidence: f64,
}

/// Body of `POST /synthesize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub request_id: String,
    pub query: String,
    pub answers: Vec<PeerAnswer>,
    pub reviews: Vec<ChairmanReview>,
    pub aggregated_ranking: Vec<RankingEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StageOptions>,
}

/// Signals the chairman reports having used
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsedSignals {
    #[serde(default)]
    pub top_ranked: Vec<String>,
    #[serde(default)]
    pub disagreements: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Response of `POST /synthesize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub chairman_id: String,
    pub final_answer: String,
    pub rationale: String,
    pub used_signals: UsedSignals,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
}

impl SynthesisResponse {
    pub fn reported_latency_ms(&self) -> Option<u64> {
        reported_latency(self.latency_ms)
    }
}

impl ResponseContract for SynthesisResponse {
    fn violation(&self) -> Option<String> {
        None
    }
}
