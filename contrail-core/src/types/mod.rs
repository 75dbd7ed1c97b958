//! Core data types for the retrieval-fusion pipeline.
//!
//! Everything here lives for a single request: passages are created by the
//! retriever, fused, formatted, and dropped once the response is built.

pub mod context;
pub mod passage;
pub mod query;
pub mod ranking;
pub mod response;

pub use context::{
    EntityDetail, EntityLink, GraphEntity, GraphPath, GraphRelationship, SupplementaryContext,
};
pub use passage::{DEFAULT_PREVIEW_CHARS, IndexMatch, Passage, PassageIdentity, metadata_keys};
pub use query::{ExpandedQuerySet, ExpansionSource, MAX_EXPANDED_QUERIES};
pub use ranking::{FusedPassage, FusedResult, RankedList};
pub use response::{NO_RESULTS_MESSAGE, PassageView, PipelineResponse, PipelineStatus};
