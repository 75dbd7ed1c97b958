//! Configuration for similarity index backends and embedders.

use serde::{Deserialize, Serialize};

use crate::{ContrailError, Result};

/// Configuration for the similarity index the retriever queries.
///
/// # Examples
///
/// ```rust
/// use contrail_core::config::IndexConfig;
///
/// let memory = IndexConfig::memory(768);
/// let qdrant = IndexConfig::qdrant("http://localhost:6334", "airline-policies", 768);
///
/// assert_eq!(memory.dimension(), 768);
/// assert!(qdrant.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexConfig {
    /// In-memory cosine index, for development and tests.
    Memory {
        /// Dimension of the vectors.
        dimension: usize,
    },

    /// Remote Qdrant collection.
    Qdrant {
        /// Qdrant server URL.
        url: String,

        /// Collection holding the passage vectors.
        collection_name: String,

        /// Dimension of the vectors.
        dimension: usize,

        /// API key for authentication.
        #[serde(default)]
        api_key: Option<String>,

        /// Client request timeout in seconds.
        #[serde(default = "default_index_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_index_timeout_secs() -> u64 {
    30
}

impl IndexConfig {
    /// In-memory index configuration.
    #[must_use]
    pub fn memory(dimension: usize) -> Self {
        Self::Memory { dimension }
    }

    /// Qdrant index configuration.
    pub fn qdrant<S1: Into<String>, S2: Into<String>>(
        url: S1,
        collection_name: S2,
        dimension: usize,
    ) -> Self {
        Self::Qdrant {
            url: url.into(),
            collection_name: collection_name.into(),
            dimension,
            api_key: None,
            timeout_secs: default_index_timeout_secs(),
        }
    }

    /// Vector dimension of the index.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Memory { dimension } | Self::Qdrant { dimension, .. } => *dimension,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.dimension() == 0 {
            return Err(ContrailError::configuration(
                "Index dimension must be greater than 0",
            ));
        }

        if let Self::Qdrant {
            url,
            collection_name,
            timeout_secs,
            ..
        } = self
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ContrailError::configuration(
                    "Qdrant URL must start with http:// or https://",
                ));
            }
            if collection_name.is_empty() {
                return Err(ContrailError::configuration(
                    "Qdrant collection name cannot be empty",
                ));
            }
            if *timeout_secs == 0 {
                return Err(ContrailError::configuration(
                    "Qdrant timeout must be greater than 0",
                ));
            }
        }

        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::memory(768)
    }
}

/// Configuration for a remote embedding API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedderConfig {
    /// Provider name; only `openai`-compatible endpoints are supported.
    pub provider: String,

    /// Embedding model name.
    pub model: String,

    /// API key for authentication.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Custom base URL for OpenAI-compatible servers.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Dimension of the produced vectors.
    pub dimension: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_embedder_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedder_timeout_secs() -> u64 {
    30
}

impl EmbedderConfig {
    /// Configuration for an `OpenAI` embedding model.
    pub fn openai<S1: Into<String>, S2: Into<String>>(model: S1, api_key: S2, dimension: usize) -> Self {
        Self {
            provider: "openai".to_string(),
            model: model.into(),
            api_key: Some(api_key.into()),
            base_url: None,
            dimension,
            timeout_secs: default_embedder_timeout_secs(),
        }
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.provider != "openai" {
            return Err(ContrailError::configuration(format!(
                "Unsupported embedding provider: {}",
                self.provider
            )));
        }
        if self.model.is_empty() {
            return Err(ContrailError::configuration("Embedding model cannot be empty"));
        }
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ContrailError::configuration(
                "API key is required for the embedding provider",
            ));
        }
        if self.dimension == 0 {
            return Err(ContrailError::configuration(
                "Embedding dimension must be greater than 0",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ContrailError::configuration(
                "Embedding timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
