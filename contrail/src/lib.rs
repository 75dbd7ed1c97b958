//! # Contrail
//!
//! Multi-query retrieval with Reciprocal Rank Fusion for customer-support
//! assistants. A question is expanded into up to four related queries, each is
//! retrieved from a similarity index, the rankings are fused, and a generative
//! model answers from the fused context.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contrail::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = ContrailConfig::from_file("contrail.toml")?;
//! let pipeline = contrail::build_pipeline(&config).await?;
//!
//! let response = pipeline.run_pipeline("Can I change my flight for free?").await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **contrail-core**: data model, capability traits, errors, configuration
//! - **contrail-query**: expansion, retrieval, fusion, synthesis, the pipeline
//! - **contrail-integrations**: similarity indexes, embedders, knowledge graph

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use contrail_core::{
    ContrailError, Embedder, Result, SimilarityIndex,
    config::{ContrailConfig, IndexConfig},
};
use contrail_query::{factory::SiumaiLlmFactory, pipeline::FusionPipeline};
use tracing::info;

// Re-export all public APIs from sub-crates
pub use contrail_core as core;
pub use contrail_integrations as integrations;
pub use contrail_query as query;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits
/// from all Contrail modules.
pub mod prelude {
    pub use contrail_query::prelude::*;

    pub use contrail_integrations::{InMemoryKnowledgeGraph, InMemorySimilarityIndex, IndexedPassage};

    #[cfg(feature = "api")]
    pub use contrail_integrations::ApiEmbedder;

    #[cfg(feature = "qdrant")]
    pub use contrail_integrations::QdrantSimilarityIndex;
}

/// Version information for the Contrail framework.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a pipeline entirely from configuration.
///
/// The embedder comes from the `embedder` section and needs the `api`
/// feature.
///
/// # Errors
///
/// Fails when the configuration is invalid, names a memory index or a
/// disabled backend, or a client cannot be created.
pub async fn build_pipeline(config: &ContrailConfig) -> Result<FusionPipeline> {
    let embedder = create_embedder(config)?;
    build_pipeline_with_embedder(config, embedder).await
}

/// Build a pipeline from configuration around a caller-supplied embedder.
///
/// The index comes from the `index` section. A memory index is filled
/// in-process, so it is rejected here; populate an
/// [`InMemorySimilarityIndex`](contrail_integrations::InMemorySimilarityIndex)
/// and pass it to [`build_pipeline_with_index`] instead.
///
/// # Errors
///
/// Fails when the configuration is invalid or names a memory index, the
/// embedder dimension differs from the index dimension, or a client cannot
/// be created.
pub async fn build_pipeline_with_embedder(
    config: &ContrailConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<FusionPipeline> {
    check_compatible(config, embedder.as_ref())?;

    if let IndexConfig::Memory { .. } = config.index {
        return Err(ContrailError::configuration(
            "A memory index starts empty; populate one and use build_pipeline_with_index",
        ));
    }

    let index = contrail_integrations::vector_stores::create_index(&config.index).await?;
    assemble(config, embedder, index).await
}

/// Build a pipeline from configuration around a caller-supplied embedder and
/// index. The `index` section only supplies the expected dimension.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use contrail::prelude::*;
///
/// # async fn example(config: ContrailConfig, embedder: Arc<dyn Embedder>) -> Result<()> {
/// let text = "Two checked bags are included.";
/// let index = InMemorySimilarityIndex::new(config.index.dimension());
/// index.insert(vec![IndexedPassage::new(text, embedder.embed(text).await?)])?;
///
/// let pipeline = contrail::build_pipeline_with_index(&config, embedder, Arc::new(index)).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails when the configuration is invalid, the embedder dimension differs
/// from the configured index dimension, or a model client cannot be created.
pub async fn build_pipeline_with_index(
    config: &ContrailConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
) -> Result<FusionPipeline> {
    check_compatible(config, embedder.as_ref())?;
    assemble(config, embedder, index).await
}

fn check_compatible(config: &ContrailConfig, embedder: &dyn Embedder) -> Result<()> {
    config.validate()?;

    if embedder.dimension() != config.index.dimension() {
        return Err(ContrailError::configuration(format!(
            "Embedder dimension {} does not match index dimension {}",
            embedder.dimension(),
            config.index.dimension()
        )));
    }
    Ok(())
}

async fn assemble(
    config: &ContrailConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
) -> Result<FusionPipeline> {
    let index_name = index.name();
    let factory = SiumaiLlmFactory::new();
    let model = factory.create_language_model(&config.llm).await?;
    let mut builder = FusionPipeline::builder()
        .embedder(embedder)
        .index(index)
        .language_model(model)
        .config(config.retrieval.clone());

    if let Some(synthesis) = &config.synthesis_llm {
        builder = builder.synthesis_model(factory.create_language_model(synthesis).await?);
    }

    info!(
        "Built pipeline with {} model and {} index",
        config.llm.provider, index_name
    );
    builder.build()
}

#[cfg(feature = "api")]
fn create_embedder(config: &ContrailConfig) -> Result<Arc<dyn Embedder>> {
    let embedder_config = config.embedder.clone().ok_or_else(|| {
        ContrailError::configuration("An embedder section is required")
    })?;
    Ok(Arc::new(contrail_integrations::ApiEmbedder::from_config(
        embedder_config,
    )?))
}

#[cfg(not(feature = "api"))]
fn create_embedder(_config: &ContrailConfig) -> Result<Arc<dyn Embedder>> {
    Err(ContrailError::configuration(
        "Building an embedder from configuration requires the `api` feature",
    ))
}
