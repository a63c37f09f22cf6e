//! Anonymous label assignment for stage-1 answers
//!
//! Labels are assigned from the sorted set of backend identities, never
//! from the order in which answers arrived, so the same set of successful
//! members always yields the same labels.

use crate::contract::PeerAnswer;
use crate::core::backend::BackendId;
use std::collections::BTreeMap;

/// An answer together with its anonymous label and author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizedAnswer {
    pub anon_id: String,
    pub answer_text: String,
    pub backend: BackendId,
}

/// Label for the answer at `index` in sorted order.
///
/// `A`..`Z` for the first 26, then `A27`, `A28`, ...
pub fn anon_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        format!("A{}", index + 1)
    }
}

/// Label assignment over the successful answers of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anonymization {
    answers: Vec<AnonymizedAnswer>,
}

impl Anonymization {
    /// Assign labels to `(backend, answer_text)` pairs.
    ///
    /// Input order is irrelevant; pairs are sorted by backend identity first.
    pub fn assign(answers: impl IntoIterator<Item = (BackendId, String)>) -> Self {
        let mut sorted: Vec<(BackendId, String)> = answers.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let answers = sorted
            .into_iter()
            .enumerate()
            .map(|(index, (backend, answer_text))| AnonymizedAnswer {
                anon_id: anon_label(index),
                answer_text,
                backend,
            })
            .collect();

        Self { answers }
    }

    /// Rebuild an assignment from a persisted label map.
    ///
    /// `answer_for` resolves a backend to its stored successful answer text;
    /// labels whose backend has no successful answer are skipped.
    pub fn restore<'a, F>(anon_map: &BTreeMap<String, BackendId>, answer_for: F) -> Self
    where
        F: Fn(&BackendId) -> Option<&'a str>,
    {
        let mut answers: Vec<AnonymizedAnswer> = anon_map
            .iter()
            .filter_map(|(anon_id, backend)| {
                answer_for(backend).map(|text| AnonymizedAnswer {
                    anon_id: anon_id.clone(),
                    answer_text: text.to_string(),
                    backend: backend.clone(),
                })
            })
            .collect();
        answers.sort_by(|a, b| a.backend.cmp(&b.backend));
        Self { answers }
    }

    /// All labelled answers in sorted backend order
    pub fn answers(&self) -> &[AnonymizedAnswer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Label → backend identity
    pub fn anon_map(&self) -> BTreeMap<String, BackendId> {
        self.answers
            .iter()
            .map(|a| (a.anon_id.clone(), a.backend.clone()))
            .collect()
    }

    /// All assigned labels in sorted backend order
    pub fn labels(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.anon_id.clone()).collect()
    }

    /// Label assigned to `backend`, if it answered successfully
    pub fn label_for(&self, backend: &BackendId) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| &a.backend == backend)
            .map(|a| a.anon_id.as_str())
    }

    /// Every labelled answer except the one written by `backend`
    pub fn peer_view(&self, backend: &BackendId) -> Vec<PeerAnswer> {
        self.answers
            .iter()
            .filter(|a| &a.backend != backend)
            .map(Self::to_peer_answer)
            .collect()
    }

    /// Every labelled answer, stripped of backend identity
    pub fn public_view(&self) -> Vec<PeerAnswer> {
        self.answers.iter().map(Self::to_peer_answer).collect()
    }

    fn to_peer_answer(answer: &AnonymizedAnswer) -> PeerAnswer {
        PeerAnswer {
            anon_id: answer.anon_id.clone(),
            answer_text: answer.answer_text.clone(),
        }
    }
}
