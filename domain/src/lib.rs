//! Domain layer for council-orchestrator
//!
//! This crate contains the core types and algorithms of the council
//! pipeline. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a panel of independent *members* and one *chairman*:
//!
//! - **Stage 1 (Answers)**: every member answers the query
//! - **Stage 2 (Peer Review)**: members rank each other's anonymized answers
//! - **Stage 3 (Synthesis)**: the chairman writes the final answer
//!
//! ## Anonymization
//!
//! Answers are labelled `A`, `B`, ... from the sorted set of member
//! identities, so reviewers never see who wrote what and labels never
//! depend on timing.

pub mod config;
pub mod contract;
pub mod core;
pub mod council;
pub mod heartbeat;
pub mod run;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use contract::{
    AnswerRequest, AnswerResponse, ChairmanReview, HealthReport, PeerAnswer, ResponseContract,
    ReviewRequest, ReviewResponse, StageOptions, SynthesisRequest, SynthesisResponse, TokenUsage,
    UsedSignals,
};
pub use core::{backend::BackendId, error::DomainError, query::Query};
pub use council::{Anonymization, RankingEntry, aggregate_rankings};
pub use heartbeat::{ChairmanHeartbeat, HealthState, HeartbeatSnapshot, HeartbeatStatus};
pub use run::{
    AnswerOutcome, AnswerRecord, RequestState, ReviewOutcome, ReviewRecord, RunStatus,
    RunSummary, Stage, Stage3State, SynthesisOutcome, SynthesisRecord,
};
