//! Query expansion, retrieval, rank fusion and answer synthesis for Contrail.
//!
//! This crate implements the answer path of the engine:
//!
//! - **Expanders**: turn one question into up to four related queries
//! - **Retriever**: embeds each query and searches the similarity index
//! - **Fusion**: merges the per-query rankings with Reciprocal Rank Fusion
//! - **Assembler and synthesizer**: format the context and produce the answer
//! - **Pipeline**: wires the stages together with timeouts and fallbacks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use contrail_query::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(embedder: Arc<dyn Embedder>, index: Arc<dyn SimilarityIndex>) -> Result<()> {
//! let model = SiumaiLlmFactory::new()
//!     .create_language_model(&LlmConfig::ollama("llama3.1"))
//!     .await?;
//!
//! let pipeline = FusionPipeline::builder()
//!     .embedder(embedder)
//!     .index(index)
//!     .language_model(model)
//!     .build()?;
//!
//! let response = pipeline.run_pipeline("What is the baggage allowance?").await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod expander;
pub mod factory;
pub mod fusion;
pub mod generator;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;

/// Re-export commonly used types and traits.
pub mod prelude {
    pub use crate::assembler::{AssembledContext, ContextAssembler};
    pub use crate::expander::{FallbackExpander, LlmQueryExpander, QueryExpander, RuleBasedExpander};
    pub use crate::factory::SiumaiLlmFactory;
    pub use crate::fusion::ReciprocalRankFusion;
    pub use crate::generator::SiumaiLanguageModel;
    pub use crate::pipeline::{FusionPipeline, FusionPipelineBuilder};
    pub use crate::retriever::VectorRetriever;
    pub use crate::synthesizer::{
        AnswerSynthesizer, ContextOnlySynthesizer, FallbackSynthesizer, LlmSynthesizer,
    };

    pub use contrail_core::prelude::*;
}
