//! API-based embedder using siumai.

use std::time::Duration;

use async_trait::async_trait;
use contrail_core::{ContrailError, Embedder, Result, config::EmbedderConfig};
use siumai::{
    providers::openai::{OpenAiConfig, OpenAiEmbeddings},
    traits::EmbeddingCapability,
};
use tracing::{debug, instrument};

/// Embedder backed by an OpenAI-compatible embedding endpoint.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_core::{Embedder, config::EmbedderConfig};
/// use contrail_integrations::ApiEmbedder;
///
/// # async fn example() -> contrail_core::Result<()> {
/// let config = EmbedderConfig::openai("text-embedding-3-small", "sk-...", 1536);
/// let embedder = ApiEmbedder::from_config(config)?;
///
/// let vector = embedder.embed("What is the refund policy?").await?;
/// assert_eq!(vector.len(), 1536);
/// # Ok(())
/// # }
/// ```
pub struct ApiEmbedder {
    config: EmbedderConfig,
    client: Box<dyn EmbeddingCapability + Send + Sync>,
}

impl std::fmt::Debug for ApiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEmbedder")
            .field("provider", &self.config.provider)
            .field("model", &self.config.model)
            .field("dimension", &self.config.dimension)
            .finish_non_exhaustive()
    }
}

impl ApiEmbedder {
    /// Create an embedder from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or the HTTP client
    /// cannot be built.
    pub fn from_config(config: EmbedderConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ContrailError::embedding(format!("Failed to create HTTP client: {e}")))?;

        let api_key = config.api_key.clone().unwrap_or_default();
        let mut openai_config = OpenAiConfig::new(&api_key).with_model(&config.model);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_base_url(base_url);
        }

        Ok(Self {
            client: Box::new(OpenAiEmbeddings::new(openai_config, http_client)),
            config,
        })
    }

    /// The configuration this embedder was built from.
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    #[instrument(skip(self, text), fields(embedder = "ApiEmbedder", model = %self.config.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .embed(vec![text.to_string()])
            .await
            .map_err(|e| ContrailError::embedding(format!("Siumai error: {e}")))?;

        let vector = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ContrailError::embedding("Embedding response was empty"))?;

        if vector.len() != self.config.dimension {
            return Err(ContrailError::embedding(format!(
                "Expected {}-dimensional embedding, got {}",
                self.config.dimension,
                vector.len()
            )));
        }

        debug!("Generated {}-dimensional embedding", vector.len());
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<()> {
        self.embed("health check").await.map(|_| ())
    }
}
