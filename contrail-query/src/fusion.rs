//! Reciprocal Rank Fusion over per-query rankings.
//!
//! RRF scores each passage by `Σ 1 / (k + rank)` over every list it appears
//! in, where `rank` is the 0-based position within that list. Passages are
//! merged by [`PassageIdentity`], so the same chunk retrieved by several
//! expanded queries accumulates score instead of appearing twice.
//!
//! Paper: "Reciprocal rank fusion outperforms Condorcet and individual rank
//! learning methods".

use std::collections::HashMap;

use contrail_core::{FusedPassage, FusedResult, Passage, PassageIdentity, RankedList};
use tracing::debug;

/// Default RRF smoothing constant.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Default number of passages kept after fusion.
pub const DEFAULT_FUSION_LIMIT: usize = 10;

/// Reciprocal Rank Fusion engine.
///
/// Fusion is pure and deterministic: passages with equal scores keep the
/// order in which they were first seen, scanning lists left to right and
/// ranks top to bottom.
///
/// # Examples
///
/// ```rust
/// use contrail_core::{Passage, RankedList};
/// use contrail_query::fusion::ReciprocalRankFusion;
///
/// let a = RankedList::new("q1", vec![Passage::new("P1"), Passage::new("P2")]);
/// let b = RankedList::new("q2", vec![Passage::new("P2"), Passage::new("P3")]);
///
/// let fused = ReciprocalRankFusion::default().fuse(&[a, b]);
/// assert_eq!(fused.passages[0].passage.content(), "P2");
/// assert_eq!(fused.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReciprocalRankFusion {
    /// Smoothing constant; higher values flatten the influence of rank.
    pub k: f64,
    /// Maximum number of passages returned.
    pub limit: usize,
}

impl Default for ReciprocalRankFusion {
    fn default() -> Self {
        Self::new(DEFAULT_RRF_K, DEFAULT_FUSION_LIMIT)
    }
}

impl ReciprocalRankFusion {
    /// Creates a new RRF fuser.
    ///
    /// `k` is expected to be finite and positive; configuration validation
    /// enforces this before a pipeline is built.
    #[must_use]
    pub fn new(k: f64, limit: usize) -> Self {
        Self { k, limit }
    }

    /// Contribution of a passage at 0-based `rank`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_rrf_score(&self, rank: usize) -> f64 {
        1.0 / (rank as f64 + self.k)
    }

    /// Fuse ranked lists into one deduplicated, bounded ranking.
    ///
    /// Empty input, or input made only of empty lists, yields an empty result.
    pub fn fuse(&self, ranked_lists: &[RankedList]) -> FusedResult {
        let mut positions: HashMap<PassageIdentity, usize> = HashMap::new();
        let mut entries: Vec<(Passage, f64)> = Vec::new();

        for list in ranked_lists {
            for (rank, passage) in list.iter().enumerate() {
                let score = self.calculate_rrf_score(rank);
                let identity = passage.identity();
                if let Some(&index) = positions.get(&identity) {
                    entries[index].1 += score;
                } else {
                    positions.insert(identity, entries.len());
                    entries.push((passage.clone(), score));
                }
            }
        }

        let candidates_seen = entries.len();

        // Stable: equal scores keep first-seen order.
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries.truncate(self.limit);

        debug!(
            "RRF fusion with k={}: {} lists, {} distinct passages, kept {}",
            self.k,
            ranked_lists.len(),
            candidates_seen,
            entries.len()
        );

        FusedResult {
            passages: entries
                .into_iter()
                .map(|(passage, score)| FusedPassage { passage, score })
                .collect(),
            lists_fused: ranked_lists.len(),
            candidates_seen,
        }
    }
}
