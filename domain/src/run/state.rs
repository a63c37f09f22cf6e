//! Per-request pipeline state (Entity)

use super::stage::Stage;
use super::status::RunStatus;
use crate::contract::{ChairmanReview, TokenUsage, UsedSignals};
use crate::core::backend::BackendId;
use crate::core::query::Query;
use crate::council::anonymize::Anonymization;
use crate::council::ranking::RankingEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Successful stage-1 answer from one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Outcome of one member's stage-1 call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnswerOutcome {
    Ok(AnswerRecord),
    Error { error: String },
}

impl AnswerOutcome {
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            AnswerOutcome::Ok(record) => Some(&record.answer_text),
            AnswerOutcome::Error { .. } => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AnswerOutcome::Ok(_))
    }
}

/// Successful stage-2 review from one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub rankings: Vec<String>,
    #[serde(default)]
    pub critiques: BTreeMap<String, String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Outcome of one member's stage-2 call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReviewOutcome {
    Ok(ReviewRecord),
    Error { error: String },
}

impl ReviewOutcome {
    pub fn as_ok(&self) -> Option<&ReviewRecord> {
        match self {
            ReviewOutcome::Ok(record) => Some(record),
            ReviewOutcome::Error { .. } => None,
        }
    }
}

/// Chairman's synthesized answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRecord {
    pub chairman_id: String,
    pub final_answer: String,
    pub rationale: String,
    pub used_signals: UsedSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SynthesisOutcome {
    Ok(SynthesisRecord),
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage3State {
    pub chairman_url: BackendId,
    #[serde(flatten)]
    pub outcome: SynthesisOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stage1State {
    /// Every member's outcome, keyed by backend identity
    #[serde(default)]
    pub answers: BTreeMap<BackendId, AnswerOutcome>,
    /// Anonymous label → backend identity, successful members only
    #[serde(default)]
    pub anon_map: BTreeMap<String, BackendId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stage2State {
    #[serde(default)]
    pub reviews: BTreeMap<BackendId, ReviewOutcome>,
    #[serde(default)]
    pub aggregated_ranking: Vec<RankingEntry>,
}

/// Listing row for a stored run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub request_id: String,
    pub created_at: DateTime<Utc>,
    pub query: String,
}

/// Full state of one council run
///
/// Owned by the orchestrator and replaced as a whole at the end of each
/// stage; other components only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestState {
    pub request_id: String,
    pub query: Query,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub stage1: Stage1State,
    #[serde(default)]
    pub stage2: Stage2State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage3: Option<Stage3State>,
}

impl RequestState {
    pub fn new(request_id: impl Into<String>, query: Query, created_at: DateTime<Utc>) -> Self {
        Self {
            request_id: request_id.into(),
            query,
            created_at,
            status: RunStatus::Created,
            stage1: Stage1State::default(),
            stage2: Stage2State::default(),
            stage3: None,
        }
    }

    /// Record the stage-1 fan-out.
    ///
    /// The run is `stage1_error` only when no member answered.
    pub fn record_answers(
        &mut self,
        answers: BTreeMap<BackendId, AnswerOutcome>,
        anonymization: &Anonymization,
    ) {
        self.stage1.answers = answers;
        self.stage1.anon_map = anonymization.anon_map();
        self.status = RunStatus::after(Stage::Answer, !anonymization.is_empty());
    }

    /// Record the stage-2 fan-out and its aggregated ranking.
    ///
    /// The run is `stage2_error` only when no reviewer succeeded; the
    /// ranking is written regardless.
    pub fn record_reviews(
        &mut self,
        reviews: BTreeMap<BackendId, ReviewOutcome>,
        aggregated_ranking: Vec<RankingEntry>,
    ) {
        let any_ok = reviews.values().any(|r| r.as_ok().is_some());
        self.stage2.reviews = reviews;
        self.stage2.aggregated_ranking = aggregated_ranking;
        self.status = RunStatus::after(Stage::Review, any_ok);
    }

    pub fn record_synthesis(&mut self, stage3: Stage3State) {
        let succeeded = matches!(stage3.outcome, SynthesisOutcome::Ok(_));
        self.stage3 = Some(stage3);
        self.status = RunStatus::after(Stage::Synthesis, succeeded);
    }

    /// Rebuild the stage-1 label assignment from stored state
    pub fn anonymization(&self) -> Anonymization {
        Anonymization::restore(&self.stage1.anon_map, |backend| {
            self.stage1
                .answers
                .get(backend)
                .and_then(AnswerOutcome::answer_text)
        })
    }

    /// Successful reviews as forwarded to the chairman, tagged with the
    /// reviewer's own anonymous label
    pub fn chairman_reviews(&self) -> Vec<ChairmanReview> {
        let anonymization = self.anonymization();
        self.stage2
            .reviews
            .iter()
            .filter_map(|(reviewer, outcome)| {
                outcome.as_ok().map(|record| ChairmanReview {
                    reviewer_anon: anonymization.label_for(reviewer).map(str::to_string),
                    rankings: record.rankings.clone(),
                    critiques: record.critiques.clone(),
                    confidence: record.confidence,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            request_id: self.request_id.clone(),
            created_at: self.created_at,
            query: self.query.content().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn backend(url: &str) -> BackendId {
        BackendId::parse(url).unwrap()
    }

    fn ok_answer(text: &str) -> AnswerOutcome {
        AnswerOutcome::Ok(AnswerRecord {
            answer_text: text.to_string(),
            latency_ms: Some(10),
            token_usage: None,
        })
    }

    fn sample_state() -> RequestState {
        let created = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let mut state = RequestState::new("req-1", Query::new("why?").unwrap(), created);

        let mut answers = BTreeMap::new();
        answers.insert(backend("http://m2"), ok_answer("two"));
        answers.insert(backend("http://m1"), ok_answer("one"));
        answers.insert(
            backend("http://m3"),
            AnswerOutcome::Error {
                error: "timeout".to_string(),
            },
        );
        let anonymization = Anonymization::assign(
            answers
                .iter()
                .filter_map(|(b, o)| o.answer_text().map(|t| (b.clone(), t.to_string()))),
        );
        state.record_answers(answers, &anonymization);
        state
    }

    #[test]
    fn test_record_answers_sets_status_and_labels() {
        let state = sample_state();
        assert_eq!(state.status, RunStatus::Stage1Done);
        assert_eq!(state.stage1.anon_map.len(), 2);
        assert_eq!(state.stage1.anon_map["A"], backend("http://m1"));
        assert_eq!(state.anonymization().len(), 2);
    }

    #[test]
    fn test_zero_answers_is_stage1_error() {
        let mut state = RequestState::new("r", Query::new("q").unwrap(), Utc::now());
        let mut answers = BTreeMap::new();
        answers.insert(
            backend("http://m1"),
            AnswerOutcome::Error {
                error: "down".to_string(),
            },
        );
        state.record_answers(answers, &Anonymization::default());
        assert_eq!(state.status, RunStatus::Stage1Error);
        assert!(state.stage1.anon_map.is_empty());
    }

    #[test]
    fn test_failed_reviews_still_write_ranking() {
        let mut state = sample_state();
        let mut reviews = BTreeMap::new();
        reviews.insert(
            backend("http://m1"),
            ReviewOutcome::Error {
                error: "boom".to_string(),
            },
        );
        let ranking = vec![RankingEntry::new("A", 0), RankingEntry::new("B", 0)];
        state.record_reviews(reviews, ranking.clone());
        assert_eq!(state.status, RunStatus::Stage2Error);
        assert_eq!(state.stage2.aggregated_ranking, ranking);
    }

    #[test]
    fn test_chairman_reviews_carry_reviewer_label() {
        let mut state = sample_state();
        let mut reviews = BTreeMap::new();
        reviews.insert(
            backend("http://m2"),
            ReviewOutcome::Ok(ReviewRecord {
                rankings: vec!["A".to_string()],
                critiques: BTreeMap::new(),
                confidence: 0.8,
                latency_ms: None,
                token_usage: None,
            }),
        );
        reviews.insert(
            backend("http://m1"),
            ReviewOutcome::Error {
                error: "boom".to_string(),
            },
        );
        state.record_reviews(reviews, vec![RankingEntry::new("A", 1)]);

        let forwarded = state.chairman_reviews();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].reviewer_anon.as_deref(), Some("B"));
        assert_eq!(state.status, RunStatus::Stage2Done);
    }

    #[test]
    fn test_state_json_shape() {
        let mut state = sample_state();
        state.record_synthesis(Stage3State {
            chairman_url: backend("http://chair"),
            outcome: SynthesisOutcome::Error {
                error: "HTTP 500".to_string(),
            },
        });

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "stage3_error");
        assert_eq!(json["query"], "why?");
        assert_eq!(json["stage1"]["answers"]["http://m1"]["status"], "ok");
        assert_eq!(json["stage1"]["answers"]["http://m3"]["error"], "timeout");
        assert_eq!(json["stage1"]["anon_map"]["B"], "http://m2");
        assert_eq!(json["stage3"]["chairman_url"], "http://chair");
        assert_eq!(json["stage3"]["status"], "error");

        let decoded: RequestState = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_summary_uses_query_text() {
        let state = sample_state();
        let summary = state.summary();
        assert_eq!(summary.request_id, "req-1");
        assert_eq!(summary.query, "why?");
        assert_eq!(summary.created_at, state.created_at);
    }
}
