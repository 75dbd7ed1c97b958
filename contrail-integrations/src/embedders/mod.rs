//! Embedding implementations.
//!
//! - [`ApiEmbedder`]: OpenAI-compatible embedding APIs via `siumai` (feature `api`)

#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "api")]
pub use api::ApiEmbedder;
