//! Capability traits for the external collaborators of the pipeline.
//!
//! - [`Embedder`] turns query text into a dense vector
//! - [`SimilarityIndex`] returns the nearest stored passages for a vector
//! - [`LanguageModel`] completes prompts for expansion and synthesis
//! - [`ContextProvider`] supplies optional structured facts
//!
//! All traits are async and object safe so components can be shared as
//! `Arc<dyn Trait>` across concurrent requests.

pub mod context;
pub mod embedder;
pub mod index;
pub mod llm;

pub use context::ContextProvider;
pub use embedder::Embedder;
pub use index::SimilarityIndex;
pub use llm::LanguageModel;
