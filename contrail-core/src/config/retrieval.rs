//! Parameters of the retrieval-fusion pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ContrailError, MAX_EXPANDED_QUERIES, Result};

/// Tunable constants of the pipeline, passed explicitly to its constructor.
///
/// # Examples
///
/// ```rust
/// use contrail_core::config::RetrievalConfig;
///
/// let config = RetrievalConfig::default()
///     .with_top_k(5)
///     .with_rrf_k(30.0);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages requested from the index per expanded query.
    pub top_k: usize,

    /// Maximum number of passages kept after fusion.
    pub max_docs_for_context: usize,

    /// RRF smoothing constant; higher values flatten the influence of rank.
    pub rrf_k: f64,

    /// Maximum number of queries in the expanded set, original included.
    pub max_expanded_queries: usize,

    /// Fused passages formatted into the prompt context.
    pub max_passages_in_prompt: usize,

    /// Passages quoted by the context-only fallback answer.
    pub fallback_passages: usize,

    /// Timeout for the query expansion model call, in milliseconds.
    pub expansion_timeout_ms: u64,

    /// Timeout for one retrieval (embedding plus index query), in milliseconds.
    pub retrieval_timeout_ms: u64,

    /// Timeout for the answer synthesis model call, in milliseconds.
    pub synthesis_timeout_ms: u64,

    /// Timeout for the supplementary context lookup, in milliseconds.
    pub context_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_docs_for_context: 10,
            rrf_k: 60.0,
            max_expanded_queries: MAX_EXPANDED_QUERIES,
            max_passages_in_prompt: 3,
            fallback_passages: 2,
            expansion_timeout_ms: 20_000,
            retrieval_timeout_ms: 10_000,
            synthesis_timeout_ms: 60_000,
            context_timeout_ms: 10_000,
        }
    }
}

impl RetrievalConfig {
    /// Set the per-query `top_k`.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the fusion output bound.
    #[must_use]
    pub fn with_max_docs_for_context(mut self, max_docs: usize) -> Self {
        self.max_docs_for_context = max_docs;
        self
    }

    /// Set the RRF constant.
    #[must_use]
    pub fn with_rrf_k(mut self, k: f64) -> Self {
        self.rrf_k = k;
        self
    }

    /// Set the expansion timeout.
    #[must_use]
    pub fn with_expansion_timeout(mut self, timeout: Duration) -> Self {
        self.expansion_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the per-query retrieval timeout.
    #[must_use]
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the synthesis timeout.
    #[must_use]
    pub fn with_synthesis_timeout(mut self, timeout: Duration) -> Self {
        self.synthesis_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the supplementary context timeout.
    #[must_use]
    pub fn with_context_timeout(mut self, timeout: Duration) -> Self {
        self.context_timeout_ms = duration_ms(timeout);
        self
    }

    /// Expansion timeout as a [`Duration`].
    pub fn expansion_timeout(&self) -> Duration {
        Duration::from_millis(self.expansion_timeout_ms)
    }

    /// Retrieval timeout as a [`Duration`].
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieval_timeout_ms)
    }

    /// Synthesis timeout as a [`Duration`].
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_millis(self.synthesis_timeout_ms)
    }

    /// Supplementary context timeout as a [`Duration`].
    pub fn context_timeout(&self) -> Duration {
        Duration::from_millis(self.context_timeout_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(ContrailError::configuration("top_k must be at least 1"));
        }

        if self.max_docs_for_context == 0 {
            return Err(ContrailError::configuration(
                "max_docs_for_context must be at least 1",
            ));
        }

        if !self.rrf_k.is_finite() || self.rrf_k <= 0.0 {
            return Err(ContrailError::configuration(
                "rrf_k must be a positive finite number",
            ));
        }

        if self.max_expanded_queries == 0 || self.max_expanded_queries > MAX_EXPANDED_QUERIES {
            return Err(ContrailError::configuration(format!(
                "max_expanded_queries must be between 1 and {MAX_EXPANDED_QUERIES}"
            )));
        }

        for (name, value) in [
            ("expansion_timeout_ms", self.expansion_timeout_ms),
            ("retrieval_timeout_ms", self.retrieval_timeout_ms),
            ("synthesis_timeout_ms", self.synthesis_timeout_ms),
            ("context_timeout_ms", self.context_timeout_ms),
        ] {
            if value == 0 {
                return Err(ContrailError::configuration(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        Ok(())
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_docs_for_context, 10);
        assert!((config.rrf_k - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.max_expanded_queries, 4);
        assert_eq!(config.max_passages_in_prompt, 3);
        assert_eq!(config.fallback_passages, 2);
        assert!(config.validate().is_ok());
    }

    #[test_case(RetrievalConfig::default().with_top_k(0) ; "zero top_k")]
    #[test_case(RetrievalConfig::default().with_max_docs_for_context(0) ; "zero max docs")]
    #[test_case(RetrievalConfig::default().with_rrf_k(0.0) ; "zero rrf k")]
    #[test_case(RetrievalConfig::default().with_rrf_k(f64::NAN) ; "nan rrf k")]
    #[test_case(RetrievalConfig::default().with_retrieval_timeout(Duration::ZERO) ; "zero timeout")]
    fn test_invalid_configs(config: RetrievalConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_accessors() {
        let config = RetrievalConfig::default().with_synthesis_timeout(Duration::from_millis(1500));
        assert_eq!(config.synthesis_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: RetrievalConfig = serde_json::from_str(r#"{"top_k": 5}"#).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_docs_for_context, 10);
    }
}
