//! External service integrations for Contrail.
//!
//! This crate provides the concrete collaborators the retrieval pipeline
//! talks to: similarity indexes, embedders, and a knowledge-graph context
//! provider.
//!
//! # Features
//!
//! - `qdrant`: [`vector_stores::QdrantSimilarityIndex`] over a remote collection
//! - `api`: [`embedders::ApiEmbedder`] for OpenAI-compatible embedding APIs
//!
//! The in-memory index and knowledge graph are always available.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod embedders;
pub mod graph_store;
pub mod vector_stores;

// Re-export commonly used types
pub use graph_store::InMemoryKnowledgeGraph;
pub use vector_stores::{InMemorySimilarityIndex, IndexedPassage};

#[cfg(feature = "api")]
pub use embedders::ApiEmbedder;

#[cfg(feature = "qdrant")]
pub use vector_stores::QdrantSimilarityIndex;
