//! Wire contract with member and chairman backends.
//!
//! These types describe the JSON exchanged with the external services.
//! Responses implement [`ResponseContract`] so the backend client can reject
//! payloads that decode but violate a range constraint; nothing untyped
//! crosses the client boundary.
//!
//! ```text
//!  Orchestrator ──GET  /health──────▶ member / chairman
//!               ──POST /answer──────▶ member
//!               ──POST /review──────▶ member
//!               ──POST /synthesize──▶ chairman
//! ```

mod chairman;
mod health;
mod member;

pub use chairman::{ChairmanReview, SynthesisRequest, SynthesisResponse, UsedSignals};
pub use health::HealthReport;
pub use member::{AnswerRequest, AnswerResponse, PeerAnswer, ReviewRequest, ReviewResponse};

use serde::{Deserialize, Serialize};

/// Token accounting reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Per-stage generation options forwarded verbatim to backends
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Range checks a decoded response must pass before it is trusted
pub trait ResponseContract {
    /// Return a description of the first violation, if any
    fn violation(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_omit_missing_temperature() {
        let json = serde_json::to_string(&StageOptions::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_token_usage_rejects_negative() {
        let result: Result<TokenUsage, _> = serde_json::from_str(
            r#"{"prompt_tokens": -1, "completion_tokens": 2, "total_tokens": 1}"#,
        );
        assert!(result.is_err());
    }
}
