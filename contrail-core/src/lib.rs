//! # Contrail Core
//!
//! Core traits, types, and configuration for the Contrail retrieval-fusion
//! engine, the answer path of an airline customer-service assistant.
//!
//! This crate provides:
//!
//! - **Data structures**: passages, expanded query sets, ranked and fused lists
//! - **Capability traits**: `Embedder`, `SimilarityIndex`, `LanguageModel`, `ContextProvider`
//! - **Configuration**: serializable pipeline constants and backend settings
//! - **Error handling**: a single error enum shared by every crate
//!
//! ## Quick Start
//!
//! ```rust
//! use contrail_core::prelude::*;
//! use serde_json::json;
//!
//! let passage = Passage::new("Carry-on bags must not exceed 7kg.")
//!     .with_metadata("filename", json!("baggage.pdf"));
//!
//! assert_eq!(passage.source(), "baggage.pdf");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude;

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ContrailError, Result};
pub use types::{
    DEFAULT_PREVIEW_CHARS, EntityDetail, EntityLink, ExpandedQuerySet, ExpansionSource,
    FusedPassage, FusedResult, GraphEntity, GraphPath, GraphRelationship, IndexMatch,
    MAX_EXPANDED_QUERIES, NO_RESULTS_MESSAGE, Passage, PassageIdentity, PassageView,
    PipelineResponse, PipelineStatus, RankedList, SupplementaryContext, metadata_keys,
};

pub use traits::*;

/// Version information for the Contrail core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
