//! Configuration for generative models.
//!
//! Models are reached through the siumai crate; this configuration names the
//! provider and model and carries the sampling parameters.

use serde::{Deserialize, Serialize};

use crate::{ContrailError, Result};

/// Providers the siumai-backed factory knows how to build.
pub const SUPPORTED_LLM_PROVIDERS: [&str; 3] = ["openai", "anthropic", "ollama"];

/// Configuration for a generative model.
///
/// # Examples
///
/// ```rust
/// use contrail_core::config::LlmConfig;
///
/// let expansion = LlmConfig::openai("gpt-4o-mini", "your-api-key").with_temperature(0.7);
/// let synthesis = LlmConfig::ollama("llama3.1").with_temperature(0.1);
///
/// assert!(expansion.validate().is_ok());
/// assert!(synthesis.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Provider name (`openai`, `anthropic`, `ollama`).
    pub provider: String,

    /// Model name or identifier.
    pub model: String,

    /// API key for authentication (not needed for Ollama).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Custom base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Temperature for generation (0.0 to 2.0).
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    /// Create a new LLM configuration.
    pub fn new<S1: Into<String>, S2: Into<String>>(provider: S1, model: S2) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Check if API key is required.
    #[must_use]
    pub fn requires_api_key(&self) -> bool {
        self.provider != "ollama"
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.provider.is_empty() {
            return Err(ContrailError::configuration("Provider cannot be empty"));
        }

        if !SUPPORTED_LLM_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ContrailError::configuration(format!(
                "Unsupported LLM provider: {}",
                self.provider
            )));
        }

        if self.model.is_empty() {
            return Err(ContrailError::configuration("Model cannot be empty"));
        }

        if self.requires_api_key() && self.api_key.is_none() {
            return Err(ContrailError::configuration(format!(
                "API key is required for provider: {}",
                self.provider
            )));
        }

        if let Some(temp) = self.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ContrailError::configuration(
                    "Temperature must be between 0.0 and 2.0",
                ));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(ContrailError::configuration(
                "Max tokens must be greater than 0",
            ));
        }

        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ContrailError::configuration(
                    "Base URL must start with http:// or https://",
                ));
            }
        }

        Ok(())
    }

    /// Create a configuration for `OpenAI` models.
    pub fn openai<S: Into<String>>(model: S, api_key: S) -> Self {
        Self::new("openai", model).with_api_key(api_key)
    }

    /// Create a configuration for Anthropic models.
    pub fn anthropic<S: Into<String>>(model: S, api_key: S) -> Self {
        Self::new("anthropic", model).with_api_key(api_key)
    }

    /// Create a configuration for Ollama models.
    pub fn ollama<S: Into<String>>(model: S) -> Self {
        Self::new("ollama", model).with_base_url("http://localhost:11434")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::new("openai", "gpt-4o-mini")
    }
}
