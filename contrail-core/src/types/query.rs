//! Expanded query sets.

use serde::{Deserialize, Serialize};

/// Maximum number of queries in an expanded set, original included.
pub const MAX_EXPANDED_QUERIES: usize = 4;

/// Where the entries of an [`ExpandedQuerySet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionSource {
    /// Paraphrases produced by a generative model.
    Model,
    /// Deterministic textual variants of the original query.
    RuleBased,
}

/// The original query plus a bounded number of related queries.
///
/// Invariants, upheld by every constructor:
/// - the original query is always present;
/// - entries are trimmed, non-blank, and unique, in first-seen order;
/// - the set never holds more than its cap, and capping never drops the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedQuerySet {
    original: String,
    queries: Vec<String>,
    source: ExpansionSource,
}

impl ExpandedQuerySet {
    /// A set holding only the original query.
    pub fn original_only<S: Into<String>>(original: S) -> Self {
        let original = original.into();
        Self {
            queries: vec![original.clone()],
            original,
            source: ExpansionSource::RuleBased,
        }
    }

    /// Build a set from generated candidates.
    ///
    /// Candidates are trimmed and blank or repeated ones are dropped. If the
    /// original is not among them it is inserted first. When more than `cap`
    /// entries remain, generated entries are dropped from the end until the
    /// set fits; the original is never dropped.
    pub fn from_candidates<S, I>(original: &str, candidates: I, cap: usize, source: ExpansionSource) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let cap = cap.max(1);
        let mut queries: Vec<String> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.as_ref().trim();
            if candidate.is_empty() || queries.iter().any(|q| q == candidate) {
                continue;
            }
            queries.push(candidate.to_string());
        }

        if !queries.iter().any(|q| q == original) {
            queries.insert(0, original.to_string());
        }

        while queries.len() > cap {
            match queries.iter().rposition(|q| q != original) {
                Some(index) => {
                    queries.remove(index);
                }
                None => break,
            }
        }

        Self {
            original: original.to_string(),
            queries,
            source,
        }
    }

    /// The user's original query.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// All queries, in retrieval order.
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Whether `query` is one of the entries.
    pub fn contains(&self, query: &str) -> bool {
        self.queries.iter().any(|q| q == query)
    }

    /// Where the entries came from.
    pub fn source(&self) -> ExpansionSource {
        self.source
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the set holds no queries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.queries.iter()
    }
}

impl<'a> IntoIterator for &'a ExpandedQuerySet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}
