//! Similarity index trait.
//!
//! A similarity index is the leaf of the retrieval path: given a query vector
//! it returns the nearest stored passages, best first. Implementations wrap a
//! remote vector database or an in-memory store.

use async_trait::async_trait;

use crate::{IndexMatch, Result};

/// Nearest-neighbour search over stored passage embeddings.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_core::traits::SimilarityIndex;
/// use contrail_core::{IndexMatch, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct EmptyIndex;
///
/// #[async_trait]
/// impl SimilarityIndex for EmptyIndex {
///     async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait SimilarityIndex: Send + Sync + std::fmt::Debug {
    /// Return up to `top_k` matches for `vector`, sorted by descending similarity.
    ///
    /// The order of the returned matches is the rank order used by fusion;
    /// callers never re-sort it.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be reached or rejects the query,
    /// e.g. because of a dimension mismatch.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>>;

    /// Get a human-readable name for this index.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Check if the index is reachable.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
