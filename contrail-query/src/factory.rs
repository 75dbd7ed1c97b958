//! Builds siumai-backed language models from configuration.

use std::sync::Arc;

use contrail_core::{ContrailError, LanguageModel, Result, config::LlmConfig};
use siumai::prelude::*;
use tracing::info;

use crate::generator::SiumaiLanguageModel;

/// Creates [`SiumaiLanguageModel`] instances from [`LlmConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_query::factory::SiumaiLlmFactory;
/// use contrail_core::config::LlmConfig;
///
/// # async fn example() -> contrail_core::Result<()> {
/// let factory = SiumaiLlmFactory::new();
///
/// let expansion = factory
///     .create_language_model(&LlmConfig::openai("gpt-4o-mini", "your-api-key"))
///     .await?;
/// let synthesis = factory
///     .create_language_model(&LlmConfig::ollama("llama3.1").with_temperature(0.1))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SiumaiLlmFactory;

impl SiumaiLlmFactory {
    /// Create a new factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Providers this factory can build.
    #[must_use]
    pub fn supported_providers(&self) -> Vec<&'static str> {
        vec!["openai", "anthropic", "ollama"]
    }

    /// Whether `config` names a supported provider.
    #[must_use]
    pub fn can_create(&self, config: &LlmConfig) -> bool {
        self.supported_providers()
            .contains(&config.provider.as_str())
    }

    /// Validate `config` for use with this factory.
    pub fn validate_config(&self, config: &LlmConfig) -> Result<()> {
        config.validate()?;

        if !self.can_create(config) {
            return Err(ContrailError::configuration(format!(
                "Unsupported provider for SiumaiLlmFactory: {}",
                config.provider
            )));
        }

        Ok(())
    }

    /// Build a language model for `config`.
    pub async fn create_language_model(&self, config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
        self.validate_config(config)?;

        let client = self.create_siumai_client(config).await?;

        info!(
            "Created {} language model {}",
            config.provider, config.model
        );

        Ok(Arc::new(
            SiumaiLanguageModel::new(client).with_model_name(config.model.clone()),
        ))
    }

    async fn create_siumai_client(&self, config: &LlmConfig) -> Result<Siumai> {
        let mut builder = match config.provider.as_str() {
            "openai" => {
                let mut builder = Siumai::builder().openai();
                if let Some(api_key) = &config.api_key {
                    builder = builder.api_key(api_key);
                }
                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }
                builder.model(&config.model)
            }
            "anthropic" => {
                let mut builder = Siumai::builder().anthropic();
                if let Some(api_key) = &config.api_key {
                    builder = builder.api_key(api_key);
                }
                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }
                builder.model(&config.model)
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .as_deref()
                    .unwrap_or("http://localhost:11434");
                Siumai::builder()
                    .ollama()
                    .base_url(base_url)
                    .model(&config.model)
            }
            other => {
                return Err(ContrailError::configuration(format!(
                    "Unsupported LLM provider: {other}"
                )));
            }
        };

        if let Some(temperature) = config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = config.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder.build().await.map_err(|e| {
            ContrailError::configuration(format!("Failed to create siumai client: {e}"))
        })
    }
}
