//! Configuration types for the Contrail engine.
//!
//! Every tunable is carried by a serializable, validatable structure and
//! passed explicitly to the component that needs it. [`ContrailConfig`]
//! aggregates them for applications that load a single file.

pub mod llm;
pub mod retrieval;
pub mod storage;

pub use llm::*;
pub use retrieval::*;
pub use storage::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{ContrailError, Result};

/// Environment variable overriding [`RetrievalConfig::top_k`].
pub const ENV_TOP_K: &str = "CONTRAIL_TOP_K";

/// Environment variable overriding [`RetrievalConfig::max_docs_for_context`].
pub const ENV_MAX_DOCS_FOR_CONTEXT: &str = "CONTRAIL_MAX_DOCS_FOR_CONTEXT";

/// Environment variable overriding [`RetrievalConfig::rrf_k`].
pub const ENV_RRF_K: &str = "CONTRAIL_RRF_K";

/// Complete configuration of a pipeline deployment.
///
/// # Examples
///
/// ```rust
/// use contrail_core::config::ContrailConfig;
///
/// let config = ContrailConfig::from_toml_str(r#"
///     [retrieval]
///     top_k = 5
///
///     [llm]
///     provider = "ollama"
///     model = "llama3.1"
///
///     [index]
///     type = "memory"
///     dimension = 384
/// "#).unwrap();
///
/// assert_eq!(config.retrieval.top_k, 5);
/// assert_eq!(config.retrieval.max_docs_for_context, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContrailConfig {
    /// Pipeline constants and timeouts.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Model used for query expansion, and for synthesis unless overridden.
    pub llm: LlmConfig,

    /// Optional separate model for answer synthesis.
    #[serde(default)]
    pub synthesis_llm: Option<LlmConfig>,

    /// Embedding API, when not supplied programmatically.
    #[serde(default)]
    pub embedder: Option<EmbedderConfig>,

    /// Similarity index backend.
    #[serde(default)]
    pub index: IndexConfig,
}

impl ContrailConfig {
    /// Create a configuration with default retrieval settings.
    #[must_use]
    pub fn new(llm: LlmConfig, index: IndexConfig) -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            llm,
            synthesis_llm: None,
            embedder: None,
            index,
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            ContrailError::configuration(format!("Invalid JSON configuration: {e}"))
        })
    }

    /// Load from a `.toml` or `.json` file, apply environment overrides and
    /// validate the result.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(ContrailError::configuration(format!(
                    "Unsupported configuration file extension: {}",
                    other.unwrap_or("<none>")
                )));
            }
        };

        debug!("Loaded configuration from {}", path.display());

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONTRAIL_*` environment overrides to the retrieval settings.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to
    /// its value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TOP_K) {
            self.retrieval.top_k = parse_override(ENV_TOP_K, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_DOCS_FOR_CONTEXT) {
            self.retrieval.max_docs_for_context = parse_override(ENV_MAX_DOCS_FOR_CONTEXT, &value)?;
        }
        if let Some(value) = lookup(ENV_RRF_K) {
            self.retrieval.rrf_k = parse_override(ENV_RRF_K, &value)?;
        }
        Ok(())
    }

    /// The model used for answer synthesis.
    #[must_use]
    pub fn synthesis_llm(&self) -> &LlmConfig {
        self.synthesis_llm.as_ref().unwrap_or(&self.llm)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        self.llm.validate()?;
        if let Some(synthesis) = &self.synthesis_llm {
            synthesis.validate()?;
        }
        if let Some(embedder) = &self.embedder {
            embedder.validate()?;
            if embedder.dimension != self.index.dimension() {
                return Err(ContrailError::configuration(format!(
                    "Embedder dimension {} does not match index dimension {}",
                    embedder.dimension,
                    self.index.dimension()
                )));
            }
        }
        self.index.validate()
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ContrailError::configuration(format!("Invalid value for {key}: {value:?}"))
    })
}
