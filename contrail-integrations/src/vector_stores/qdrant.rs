//! Qdrant-backed similarity index.
//!
//! Passages live as points in a Qdrant collection. The payload key `text`
//! holds the passage content; every other payload key is returned as
//! metadata.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use contrail_core::{ContrailError, IndexMatch, Result, SimilarityIndex, config::IndexConfig};
use qdrant_client::qdrant::{ScoredPoint, SearchPointsBuilder, Value as QdrantValue, value::Kind};
use qdrant_client::{Qdrant, QdrantError};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

/// Payload key holding the passage text.
pub const TEXT_PAYLOAD_KEY: &str = "text";

/// Similarity index over a Qdrant collection.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_core::config::IndexConfig;
/// use contrail_integrations::QdrantSimilarityIndex;
///
/// # async fn example() -> contrail_core::Result<()> {
/// let config = IndexConfig::qdrant("http://localhost:6334", "airline-policies", 768);
/// let index = QdrantSimilarityIndex::from_config(&config).await?;
/// # Ok(())
/// # }
/// ```
pub struct QdrantSimilarityIndex {
    client: Qdrant,
    collection_name: String,
    dimension: usize,
}

impl std::fmt::Debug for QdrantSimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantSimilarityIndex")
            .field("collection_name", &self.collection_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl QdrantSimilarityIndex {
    /// Connect to the collection described by a `qdrant` index configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is not a Qdrant one, the client cannot be
    /// built, or the server does not answer the health check.
    pub async fn from_config(config: &IndexConfig) -> Result<Self> {
        let IndexConfig::Qdrant {
            url,
            collection_name,
            dimension,
            api_key,
            timeout_secs,
        } = config
        else {
            return Err(ContrailError::configuration(
                "QdrantSimilarityIndex requires a qdrant index configuration",
            ));
        };

        info!(
            "Creating QdrantSimilarityIndex with URL: {}, collection: {}",
            url, collection_name
        );

        let mut builder = Qdrant::from_url(url);
        if let Some(api_key) = api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .timeout(Duration::from_secs(*timeout_secs))
            .build()
            .map_err(|e| {
                error!("Failed to create Qdrant client: {}", e);
                map_qdrant_error(e)
            })?;

        let index = Self {
            client,
            collection_name: collection_name.clone(),
            dimension: *dimension,
        };
        index.health_check().await?;

        Ok(index)
    }

    /// Name of the queried collection.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

#[async_trait]
impl SimilarityIndex for QdrantSimilarityIndex {
    #[instrument(skip(self, vector), fields(index = "QdrantSimilarityIndex"))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        if vector.len() != self.dimension {
            return Err(ContrailError::validation(format!(
                "Query vector dimension {} does not match collection dimension {}",
                vector.len(),
                self.dimension
            )));
        }

        let request =
            SearchPointsBuilder::new(&self.collection_name, vector.to_vec(), top_k as u64)
                .with_payload(true);

        let response = self.client.search_points(request).await.map_err(|e| {
            error!("Failed to search in Qdrant: {}", e);
            map_qdrant_error(e)
        })?;

        debug!(
            "Qdrant returned {} points from '{}'",
            response.result.len(),
            self.collection_name
        );

        Ok(response.result.into_iter().map(scored_point_to_match).collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.client.health_check().await.map_err(|e| {
            error!("Qdrant health check failed: {}", e);
            map_qdrant_error(e)
        })?;
        Ok(())
    }
}

/// Split a point's payload into passage text and metadata.
fn scored_point_to_match(point: ScoredPoint) -> IndexMatch {
    let mut payload = point.payload;
    let text = payload
        .remove(TEXT_PAYLOAD_KEY)
        .map(|v| match v.kind {
            Some(Kind::StringValue(s)) => s,
            _ => String::new(),
        })
        .unwrap_or_default();

    let metadata: HashMap<String, Value> = payload
        .iter()
        .map(|(k, v)| (k.clone(), qdrant_value_to_json(v)))
        .collect();

    IndexMatch::new(text, metadata, point.score)
}

/// Convert a Qdrant payload value to JSON.
pub fn qdrant_value_to_json(value: &QdrantValue) -> Value {
    match &value.kind {
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::IntegerValue(i)) => Value::Number((*i).into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number),
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_value_to_json(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

/// Convert a Qdrant client error to a [`ContrailError`].
pub fn map_qdrant_error(error: QdrantError) -> ContrailError {
    match error {
        QdrantError::ResponseError { status } => {
            let message = status.message();
            if message.contains("not found") {
                ContrailError::similarity_index(format!("Qdrant collection not found: {message}"))
            } else if message.contains("permission") || message.contains("unauthorized") {
                ContrailError::similarity_index(format!("Qdrant authentication error: {status}"))
            } else if message.contains("timeout") {
                ContrailError::timeout("qdrant search")
            } else {
                ContrailError::similarity_index(format!("Qdrant HTTP error: {status}"))
            }
        }
        QdrantError::ConversionError(source) => {
            ContrailError::similarity_index(format!("Qdrant conversion error: {source}"))
        }
        other => ContrailError::similarity_index(format!("Qdrant error: {other}")),
    }
}
