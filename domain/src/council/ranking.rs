//! Borda-style aggregation of peer review rankings

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One row of the aggregated ranking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub anon_id: String,
    pub score: u64,
}

impl RankingEntry {
    pub fn new(anon_id: impl Into<String>, score: u64) -> Self {
        Self {
            anon_id: anon_id.into(),
            score,
        }
    }
}

/// Combine per-reviewer rankings into a single score table.
///
/// Each reviewer's list is first reduced to known labels, keeping only the
/// first occurrence of each. For a reduced list of length `k` the label at
/// position `i` earns `k - i` points. Every known label appears exactly once
/// in the result, sorted by score descending, then by label ascending.
///
/// ```
/// use council_domain::council::{aggregate_rankings, RankingEntry};
///
/// let reviews = vec![vec!["A".to_string(), "A".to_string(), "B".to_string(), "X".to_string()]];
/// let known = vec!["A".to_string(), "B".to_string()];
///
/// assert_eq!(
///     aggregate_rankings(&reviews, &known),
///     vec![RankingEntry::new("A", 2), RankingEntry::new("B", 1)]
/// );
/// ```
pub fn aggregate_rankings<R>(reviews: &[R], known_labels: &[String]) -> Vec<RankingEntry>
where
    R: AsRef<[String]>,
{
    let mut scores: BTreeMap<&str, u64> = known_labels
        .iter()
        .map(|label| (label.as_str(), 0))
        .collect();

    for ranking in reviews {
        let mut seen = HashSet::new();
        let filtered: Vec<&str> = ranking
            .as_ref()
            .iter()
            .map(String::as_str)
            .filter(|label| scores.contains_key(label) && seen.insert(*label))
            .collect();

        let total = filtered.len() as u64;
        for (index, label) in filtered.into_iter().enumerate() {
            if let Some(score) = scores.get_mut(label) {
                *score += total - index as u64;
            }
        }
    }

    let mut table: Vec<RankingEntry> = scores
        .into_iter()
        .map(|(label, score)| RankingEntry::new(label, score))
        .collect();
    table.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.anon_id.cmp(&b.anon_id)));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupes_and_drops_unknown() {
        let reviews = vec![labels(&["A", "A", "B", "X", "B"])];
        let result = aggregate_rankings(&reviews, &labels(&["A", "B"]));
        assert_eq!(
            result,
            vec![RankingEntry::new("A", 2), RankingEntry::new("B", 1)]
        );
    }

    #[test]
    fn test_no_reviews_sorts_by_label() {
        let reviews: Vec<Vec<String>> = vec![];
        let result = aggregate_rankings(&reviews, &labels(&["B", "A"]));
        assert_eq!(
            result,
            vec![RankingEntry::new("A", 0), RankingEntry::new("B", 0)]
        );
    }

    #[test]
    fn test_sums_across_reviewers() {
        // Reviewer of A ranks B, C; reviewer of B ranks C, A; reviewer of C ranks A, B
        let reviews = vec![
            labels(&["B", "C"]),
            labels(&["C", "A"]),
            labels(&["A", "B"]),
        ];
        let result = aggregate_rankings(&reviews, &labels(&["A", "B", "C"]));
        assert_eq!(
            result,
            vec![
                RankingEntry::new("A", 3),
                RankingEntry::new("B", 3),
                RankingEntry::new("C", 3),
            ]
        );
    }

    #[test]
    fn test_unranked_known_label_scores_zero() {
        let reviews = vec![labels(&["C", "A"])];
        let result = aggregate_rankings(&reviews, &labels(&["A", "B", "C"]));
        assert_eq!(
            result,
            vec![
                RankingEntry::new("C", 2),
                RankingEntry::new("A", 1),
                RankingEntry::new("B", 0),
            ]
        );
    }

    #[test]
    fn test_empty_ranking_contributes_nothing() {
        let reviews = vec![labels(&[]), labels(&["B"])];
        let result = aggregate_rankings(&reviews, &labels(&["A", "B"]));
        assert_eq!(
            result,
            vec![RankingEntry::new("B", 1), RankingEntry::new("A", 0)]
        );
    }

    #[test]
    fn test_tie_break_is_lexicographic_past_z() {
        let reviews: Vec<Vec<String>> = vec![];
        let result = aggregate_rankings(&reviews, &labels(&["B", "A27", "A"]));
        let order: Vec<&str> = result.iter().map(|e| e.anon_id.as_str()).collect();
        assert_eq!(order, vec!["A", "A27", "B"]);
    }
}
