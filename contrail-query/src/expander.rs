//! Query expansion.
//!
//! An expander turns one user question into a small set of related queries
//! that are retrieved independently and fused. The model-backed expander asks
//! a generative model for paraphrases; the rule-based expander derives
//! textual variants locally and never fails. [`FallbackExpander`] joins the
//! two so the pipeline always receives a usable set.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contrail_core::{
    ContrailError, ExpandedQuerySet, ExpansionSource, LanguageModel, MAX_EXPANDED_QUERIES, Result,
};
use tracing::{debug, info, instrument, warn};

/// Default prompt for airline-policy query expansion.
///
/// `{query}` is replaced with the user's question.
pub const DEFAULT_EXPANSION_PROMPT: &str = r#"Generate 4 semantically similar queries to the following question about airline policies.
Make sure each query explores different aspects of the same topic and uses different wording.

Original query: "{query}"

Please provide exactly 4 different queries that would help retrieve relevant information about the same topic.
Format your response as a simple list, one query per line, without numbering or bullet points."#;

/// Variants with this many characters or fewer are discarded by the
/// rule-based expander.
pub const MIN_VARIANT_CHARS: usize = 5;

/// Expands a user query into related queries.
#[async_trait]
pub trait QueryExpander: Send + Sync + std::fmt::Debug {
    /// Expand `query`. The result always contains `query` itself.
    ///
    /// # Errors
    ///
    /// Model-backed expanders fail when the model call fails, times out, or
    /// produces no usable line.
    async fn expand(&self, query: &str) -> Result<ExpandedQuerySet>;

    /// Get a human-readable name for this expander.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Expands queries by asking a generative model for paraphrases.
#[derive(Debug, Clone)]
pub struct LlmQueryExpander {
    model: Arc<dyn LanguageModel>,
    prompt_template: String,
    max_queries: usize,
    timeout: Duration,
}

impl LlmQueryExpander {
    /// Creates an expander with the default prompt, cap and a 20 second timeout.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompt_template: DEFAULT_EXPANSION_PROMPT.to_string(),
            max_queries: MAX_EXPANDED_QUERIES,
            timeout: Duration::from_secs(20),
        }
    }

    /// Sets the prompt template; `{query}` marks where the question goes.
    #[must_use]
    pub fn with_prompt_template<S: Into<String>>(mut self, template: S) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Sets the maximum size of the expanded set, clamped to `1..=4`.
    #[must_use]
    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.clamp(1, MAX_EXPANDED_QUERIES);
        self
    }

    /// Sets the model call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(&self, query: &str) -> String {
        self.prompt_template.replace("{query}", query)
    }
}

#[async_trait]
impl QueryExpander for LlmQueryExpander {
    #[instrument(skip(self), fields(expander = "LlmQueryExpander"))]
    async fn expand(&self, query: &str) -> Result<ExpandedQuerySet> {
        let prompt = self.build_prompt(query);
        debug!("Built expansion prompt with {} characters", prompt.len());

        let content = tokio::time::timeout(self.timeout, self.model.complete(&prompt))
            .await
            .map_err(|_| ContrailError::timeout("query expansion"))??;

        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(ContrailError::llm("Query expansion returned no queries"));
        }

        let expanded =
            ExpandedQuerySet::from_candidates(query, lines, self.max_queries, ExpansionSource::Model);

        info!("Generated {} queries", expanded.len());
        for (i, q) in expanded.iter().enumerate() {
            debug!("  {}. {}", i + 1, q);
        }

        Ok(expanded)
    }
}

/// Derives deterministic textual variants of a query.
///
/// Variants are the original, the original without `?`, the lowercased
/// original, and the original with `What` replaced by `How` and `?`
/// removed. Variants of five characters or fewer are dropped.
#[derive(Debug, Clone)]
pub struct RuleBasedExpander {
    max_queries: usize,
}

impl Default for RuleBasedExpander {
    fn default() -> Self {
        Self {
            max_queries: MAX_EXPANDED_QUERIES,
        }
    }
}

impl RuleBasedExpander {
    /// Creates a rule-based expander with the default cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum size of the expanded set, clamped to `1..=4`.
    #[must_use]
    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.clamp(1, MAX_EXPANDED_QUERIES);
        self
    }

    /// Expand without going through the async trait.
    #[must_use]
    pub fn variants(&self, query: &str) -> ExpandedQuerySet {
        let candidates = [
            query.to_string(),
            query.replace('?', ""),
            query.to_lowercase(),
            query.replace("What", "How").replace('?', ""),
        ];

        let kept: Vec<&String> = candidates
            .iter()
            .filter(|variant| variant.chars().count() > MIN_VARIANT_CHARS)
            .collect();

        if kept.is_empty() {
            return ExpandedQuerySet::original_only(query);
        }

        ExpandedQuerySet::from_candidates(query, kept, self.max_queries, ExpansionSource::RuleBased)
    }
}

#[async_trait]
impl QueryExpander for RuleBasedExpander {
    async fn expand(&self, query: &str) -> Result<ExpandedQuerySet> {
        Ok(self.variants(query))
    }
}

/// Tries a primary expander and falls back to a secondary one on error.
#[derive(Debug, Clone)]
pub struct FallbackExpander {
    primary: Arc<dyn QueryExpander>,
    fallback: Arc<dyn QueryExpander>,
}

impl FallbackExpander {
    /// Creates the decorator.
    pub fn new(primary: Arc<dyn QueryExpander>, fallback: Arc<dyn QueryExpander>) -> Self {
        Self { primary, fallback }
    }

    /// Model-backed expansion with rule-based fallback, both capped at `max_queries`.
    pub fn with_rule_based(model: Arc<dyn LanguageModel>, max_queries: usize, timeout: Duration) -> Self {
        Self::new(
            Arc::new(
                LlmQueryExpander::new(model)
                    .with_max_queries(max_queries)
                    .with_timeout(timeout),
            ),
            Arc::new(RuleBasedExpander::new().with_max_queries(max_queries)),
        )
    }
}

#[async_trait]
impl QueryExpander for FallbackExpander {
    async fn expand(&self, query: &str) -> Result<ExpandedQuerySet> {
        match self.primary.expand(query).await {
            Ok(expanded) => Ok(expanded),
            Err(e) => {
                warn!(
                    "{} failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback.expand(query).await
            }
        }
    }
}
