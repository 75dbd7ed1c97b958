//! Similarity index implementations.
//!
//! - [`InMemorySimilarityIndex`]: brute-force cosine search, for development
//!   and tests
//! - [`QdrantSimilarityIndex`]: a remote Qdrant collection (feature `qdrant`)

use std::sync::Arc;

use contrail_core::{Result, SimilarityIndex, config::IndexConfig};

pub mod memory;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use memory::{InMemorySimilarityIndex, IndexedPassage, cosine_similarity};

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantSimilarityIndex;

/// Build the similarity index described by `config`.
///
/// A memory index starts empty; a Qdrant index connects and runs a health
/// check before it is returned.
///
/// # Errors
///
/// Fails on an invalid configuration, on a Qdrant connection failure, or
/// when the configuration names a backend whose feature is disabled.
pub async fn create_index(config: &IndexConfig) -> Result<Arc<dyn SimilarityIndex>> {
    config.validate()?;

    match config {
        IndexConfig::Memory { dimension } => Ok(Arc::new(InMemorySimilarityIndex::new(*dimension))),
        #[cfg(feature = "qdrant")]
        IndexConfig::Qdrant { .. } => Ok(Arc::new(QdrantSimilarityIndex::from_config(config).await?)),
        #[cfg(not(feature = "qdrant"))]
        IndexConfig::Qdrant { .. } => Err(contrail_core::ContrailError::configuration(
            "Qdrant index requested but the `qdrant` feature is not enabled",
        )),
    }
}
