//! Per-query retrieval against a similarity index.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use contrail_core::{
    ContrailError, Embedder, ExpandedQuerySet, IndexMatch, Passage, RankedList, Result,
    SimilarityIndex, metadata_keys,
};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Embeds a query and fetches its nearest passages.
///
/// Failures never propagate out of [`VectorRetriever::retrieve`]: a query
/// whose embedding or index call fails (or times out) contributes an empty
/// list, and fusion proceeds with the others.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_query::retriever::VectorRetriever;
/// use std::sync::Arc;
///
/// # async fn example(embedder: Arc<dyn contrail_core::Embedder>, index: Arc<dyn contrail_core::SimilarityIndex>) {
/// let retriever = VectorRetriever::new(embedder, index);
/// let ranked = retriever.retrieve("What is the refund policy?", 3).await;
/// println!("{} passages", ranked.len());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    timeout: Duration,
}

impl VectorRetriever {
    /// Creates a retriever with a 10 second per-query timeout.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn SimilarityIndex>) -> Self {
        Self {
            embedder,
            index,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the timeout covering embedding plus index query.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retrieve up to `top_k` passages for `query`, in index rank order.
    #[instrument(skip(self), fields(retriever = "VectorRetriever"))]
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RankedList {
        match self.try_retrieve(query, top_k).await {
            Ok(passages) => {
                info!("Retrieved {} passages", passages.len());
                RankedList::new(query, passages)
            }
            Err(e) => {
                warn!("Retrieval failed for query '{}': {}", query, e);
                RankedList::empty(query)
            }
        }
    }

    /// Retrieve every query of `queries` concurrently.
    ///
    /// Lists are returned in the order of the queries, whatever order the
    /// calls complete in.
    pub async fn retrieve_all(&self, queries: &ExpandedQuerySet, top_k: usize) -> Vec<RankedList> {
        join_all(queries.iter().map(|q| self.retrieve(q, top_k))).await
    }

    async fn try_retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let matches = tokio::time::timeout(self.timeout, async {
            debug!("Generating embedding for query: {}", query);
            let vector = self.embedder.embed(query).await?;

            debug!("Querying {} with top_k: {}", self.index.name(), top_k);
            self.index.query(&vector, top_k).await
        })
        .await
        .map_err(|_| ContrailError::timeout("retrieval"))??;

        Ok(matches.into_iter().map(to_passage).collect())
    }
}

/// Map an index match to a passage carrying the source metadata fields.
fn to_passage(m: IndexMatch) -> Passage {
    let IndexMatch {
        text,
        mut metadata,
        score,
    } = m;

    let mut fields: HashMap<String, Value> = HashMap::new();
    fields.insert(
        metadata_keys::FILENAME.to_string(),
        take_or(&mut metadata, metadata_keys::FILENAME, "unknown"),
    );
    fields.insert(
        metadata_keys::FILE_TYPE.to_string(),
        take_or(&mut metadata, metadata_keys::FILE_TYPE, "unknown"),
    );
    fields.insert(
        metadata_keys::FILE_PATH.to_string(),
        take_or(&mut metadata, metadata_keys::FILE_PATH, ""),
    );
    for key in [metadata_keys::CHUNK_START, metadata_keys::CHUNK_END] {
        if let Some(value) = metadata.remove(key) {
            fields.insert(key.to_string(), value);
        }
    }

    Passage::with_metadata_map(text, fields).with_score(score)
}

fn take_or(metadata: &mut HashMap<String, Value>, key: &str, default: &str) -> Value {
    metadata
        .remove(key)
        .unwrap_or_else(|| Value::String(default.to_string()))
}
