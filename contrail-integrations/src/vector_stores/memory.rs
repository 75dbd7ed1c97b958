//! In-memory similarity index.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contrail_core::{ContrailError, IndexMatch, Result, SimilarityIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// A stored passage with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    /// Passage embedding.
    pub embedding: Vec<f32>,
    /// Passage text.
    pub content: String,
    /// Source metadata such as `filename` and `file_type`.
    pub metadata: HashMap<String, Value>,
}

impl IndexedPassage {
    /// Create a passage without metadata.
    pub fn new<S: Into<String>>(content: S, embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Brute-force cosine similarity index held in memory.
///
/// Results are sorted by descending cosine similarity; passages with equal
/// scores keep their insertion order.
///
/// # Examples
///
/// ```rust
/// use contrail_integrations::{InMemorySimilarityIndex, IndexedPassage};
/// use contrail_core::SimilarityIndex;
///
/// # #[tokio::main]
/// # async fn main() -> contrail_core::Result<()> {
/// let index = InMemorySimilarityIndex::new(2);
/// index.insert(vec![
///     IndexedPassage::new("Two checked bags are included.", vec![1.0, 0.0])
///         .with_metadata("filename", "baggage.pdf"),
/// ])?;
///
/// let matches = index.query(&[1.0, 0.0], 3).await?;
/// assert_eq!(matches[0].text, "Two checked bags are included.");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InMemorySimilarityIndex {
    dimension: usize,
    passages: Arc<RwLock<Vec<IndexedPassage>>>,
}

impl InMemorySimilarityIndex {
    /// Create an empty index for vectors of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            passages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Vector dimension of the index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Store passages. Nothing is stored if any embedding has the wrong dimension.
    ///
    /// # Errors
    ///
    /// Returns a validation error on a dimension mismatch.
    pub fn insert(&self, passages: Vec<IndexedPassage>) -> Result<usize> {
        for passage in &passages {
            self.validate_vector(&passage.embedding)?;
        }

        let count = passages.len();
        self.write()?.extend(passages);
        info!("Stored {} passages in memory index", count);
        Ok(count)
    }

    /// Number of stored passages.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the index holds no passages.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Remove every passage.
    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    fn validate_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(ContrailError::validation(format!(
                "Vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<IndexedPassage>>> {
        self.passages
            .read()
            .map_err(|_| ContrailError::similarity_index("Failed to acquire read lock on index"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<IndexedPassage>>> {
        self.passages
            .write()
            .map_err(|_| ContrailError::similarity_index("Failed to acquire write lock on index"))
    }
}

#[async_trait]
impl SimilarityIndex for InMemorySimilarityIndex {
    #[instrument(skip(self, vector), fields(index = "InMemorySimilarityIndex"))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        self.validate_vector(vector)?;

        let passages = self.read()?;
        let mut scored: Vec<(usize, f32)> = passages
            .iter()
            .enumerate()
            .map(|(i, p)| (i, cosine_similarity(vector, &p.embedding)))
            .collect();

        // Stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        debug!("Scored {} passages, returning {}", passages.len(), scored.len());

        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let p = &passages[i];
                IndexMatch::new(p.content.clone(), p.metadata.clone(), score)
            })
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

/// Cosine similarity of two vectors; zero when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
