//! Supplementary context provider trait.

use async_trait::async_trait;

use crate::{Result, SupplementaryContext};

/// Looks up structured facts related to a query, e.g. from a knowledge graph.
///
/// The provider is optional enrichment: the pipeline treats its absence,
/// failure, or timeout as "no supplementary context".
#[async_trait]
pub trait ContextProvider: Send + Sync + std::fmt::Debug {
    /// Look up facts for `query`.
    async fn lookup(&self, query: &str) -> Result<SupplementaryContext>;

    /// Get a human-readable name for this provider.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
