use super::{ResponseContract, StageOptions, TokenUsage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An anonymized answer as shown to a reviewer or the chairman
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAnswer {
    pub anon_id: String,
    pub answer_text: String,
}

/// Body of `POST /answer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub request_id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StageOptions>,
}

/// Response of `POST /answer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub member_id: String,
    pub answer_text: String,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
}

impl AnswerResponse {
    /// Latency reported by the member, if it is a usable number
    pub fn reported_latency_ms(&self) -> Option<u64> {
        reported_latency(self.latency_ms)
    }
}

impl ResponseContract for AnswerResponse {
    fn violation(&self) -> Option<String> {
        None
    }
}

/// Body of `POST /review`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub request_id: String,
    pub query: String,
    pub peer_answers: Vec<PeerAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StageOptions>,
}

/// Response of `POST /review`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub member_id: String,
    /// Anonymous labels, best first
    pub rankings: Vec<String>,
    #[serde(default)]
    pub critiques: BTreeMap<String, String>,
    pub confidence: f64,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
}

impl ReviewResponse {
    /// Latency reported by the reviewer, if it is a usable number
    pub fn reported_latency_ms(&self) -> Option<u64> {
        reported_latency(self.latency_ms)
    }
}

impl ResponseContract for ReviewResponse {
    fn violation(&self) -> Option<String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Some(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            ));
        }
        None
    }
}

pub(super) fn reported_latency(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}
