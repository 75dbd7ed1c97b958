//! Ranked passage lists and fused results.

use serde::{Deserialize, Serialize};

use super::Passage;

/// Passages returned for one expanded query, best match first.
///
/// Rank position (0-based) is the only thing fusion reads; scores carried in
/// passage metadata are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    /// The expanded query these passages were retrieved for.
    pub query: String,
    /// Passages in index order.
    pub passages: Vec<Passage>,
}

impl RankedList {
    /// Create a ranked list.
    pub fn new<S: Into<String>>(query: S, passages: Vec<Passage>) -> Self {
        Self {
            query: query.into(),
            passages,
        }
    }

    /// An empty list, the contribution of a failed retrieval.
    pub fn empty<S: Into<String>>(query: S) -> Self {
        Self::new(query, Vec::new())
    }

    /// Number of passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether the list holds no passages.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Iterate over passages in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Passage> {
        self.passages.iter()
    }
}

/// A passage with its accumulated fusion score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedPassage {
    /// The deduplicated passage.
    pub passage: Passage,
    /// Sum of `1 / (rank + k)` over every list containing the passage.
    pub score: f64,
}

/// The fused, deduplicated, bounded ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    /// Unique passages by descending fusion score; ties keep first-seen order.
    pub passages: Vec<FusedPassage>,
    /// Number of ranked lists given to fusion, empty ones included.
    pub lists_fused: usize,
    /// Number of distinct passages seen before truncation.
    pub candidates_seen: usize,
}

impl FusedResult {
    /// Number of passages kept.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether fusion produced nothing.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Iterate over the fused passages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FusedPassage> {
        self.passages.iter()
    }

    /// The first `n` fused passages (fewer if the result is shorter).
    pub fn top(&self, n: usize) -> &[FusedPassage] {
        &self.passages[..n.min(self.passages.len())]
    }
}
