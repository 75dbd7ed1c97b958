//! Embedding generation trait.
//!
//! The embedder turns an expanded query into the dense vector the similarity
//! index is searched with. It must produce vectors of the same dimension the
//! index was built with.

use async_trait::async_trait;

use crate::Result;

/// Generates dense embeddings for text.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_core::traits::Embedder;
/// use contrail_core::Result;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct ConstantEmbedder {
///     dimension: usize,
/// }
///
/// #[async_trait]
/// impl Embedder for ConstantEmbedder {
///     async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
///         Ok(vec![0.1; self.dimension])
///     }
///
///     fn dimension(&self) -> usize {
///         self.dimension
///     }
///
///     fn model_name(&self) -> &str {
///         "constant"
///     }
/// }
/// ```
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Generate the embedding for a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or the remote service fails.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors produced by this embedder.
    fn dimension(&self) -> usize;

    /// Identifier of the embedding model.
    fn model_name(&self) -> &str;

    /// Get a human-readable name for this embedder.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Check if the embedder is ready to serve requests.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
