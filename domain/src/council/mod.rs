//! Council algorithms: anonymization and ranking aggregation
//!
//! Both are pure functions of their input sets. Neither depends on the
//! order in which backend calls completed.

pub mod anonymize;
pub mod ranking;

pub use anonymize::{AnonymizedAnswer, Anonymization, anon_label};
pub use ranking::{RankingEntry, aggregate_rankings};
