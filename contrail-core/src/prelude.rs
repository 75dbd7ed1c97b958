//! Prelude module for convenient imports.
//!
//! ```rust
//! use contrail_core::prelude::*;
//!
//! let config = RetrievalConfig::default();
//! assert_eq!(config.top_k, 3);
//! ```

pub use crate::error::{ContrailError, Result};

pub use crate::types::{
    EntityDetail, EntityLink, ExpandedQuerySet, ExpansionSource, FusedPassage, FusedResult,
    GraphEntity, GraphPath, GraphRelationship, IndexMatch, MAX_EXPANDED_QUERIES,
    NO_RESULTS_MESSAGE, Passage, PassageIdentity, PassageView, PipelineResponse, PipelineStatus,
    RankedList, SupplementaryContext, metadata_keys,
};

pub use crate::traits::{ContextProvider, Embedder, LanguageModel, SimilarityIndex};

pub use crate::config::{ContrailConfig, EmbedderConfig, IndexConfig, LlmConfig, RetrievalConfig};
