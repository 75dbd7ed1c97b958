//! The end-to-end retrieval-fusion pipeline.
//!
//! ```text
//! query → expander → {q1..q4} → retriever ×4 (concurrent) → RRF fusion
//!       → context assembler (+ knowledge graph) → synthesizer → answer
//! ```
//!
//! Every external call is bounded by a timeout and recovered locally, so a
//! run only fails on an empty query.

use std::sync::Arc;

use contrail_core::{
    ContextProvider, ContrailError, Embedder, FusedResult, LanguageModel, PassageView,
    PipelineResponse, PipelineStatus, Result, SimilarityIndex, SupplementaryContext,
    config::RetrievalConfig,
};
use tracing::{debug, info, instrument, warn};

use crate::assembler::ContextAssembler;
use crate::expander::{FallbackExpander, QueryExpander, RuleBasedExpander};
use crate::fusion::ReciprocalRankFusion;
use crate::retriever::VectorRetriever;
use crate::synthesizer::{AnswerSynthesizer, ContextOnlySynthesizer, FallbackSynthesizer};

/// Multi-query retrieval with Reciprocal Rank Fusion and answer synthesis.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_query::pipeline::FusionPipeline;
/// use contrail_core::config::RetrievalConfig;
/// use std::sync::Arc;
///
/// # async fn example(
/// #     embedder: Arc<dyn contrail_core::Embedder>,
/// #     index: Arc<dyn contrail_core::SimilarityIndex>,
/// #     model: Arc<dyn contrail_core::LanguageModel>,
/// # ) -> contrail_core::Result<()> {
/// let pipeline = FusionPipeline::builder()
///     .embedder(embedder)
///     .index(index)
///     .language_model(model)
///     .config(RetrievalConfig::default())
///     .build()?;
///
/// let response = pipeline.run_pipeline("Can I change my flight for free?").await?;
/// println!("{}: {}", response.status, response.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FusionPipeline {
    expander: Arc<dyn QueryExpander>,
    retriever: VectorRetriever,
    fusion: ReciprocalRankFusion,
    assembler: ContextAssembler,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    context_provider: Option<Arc<dyn ContextProvider>>,
    config: RetrievalConfig,
}

impl FusionPipeline {
    /// Create a builder for constructing pipelines.
    pub fn builder() -> FusionPipelineBuilder {
        FusionPipelineBuilder::new()
    }

    /// The configuration the pipeline was built with.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Answer `query` from the knowledge base.
    ///
    /// Returns `no_results` when every retrieval came back empty or failed.
    ///
    /// # Errors
    ///
    /// Only an empty or whitespace-only query is rejected.
    #[instrument(skip(self), fields(pipeline = "FusionPipeline"))]
    pub async fn run_pipeline(&self, query: &str) -> Result<PipelineResponse> {
        let normalized = validate_query(query)?;
        info!("Processing query through pipeline: {}", normalized);

        let fused = self.fuse(normalized).await;
        if fused.is_empty() {
            info!("No passages retrieved");
            return Ok(PipelineResponse::no_results(query));
        }

        let supplementary = self.lookup_context(normalized).await;
        let context = self.assembler.assemble(&fused, supplementary.as_ref());

        let answer = match self.synthesizer.synthesize(normalized, &fused, &context).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Answer synthesis failed ({}), answering from context", e);
                ContextOnlySynthesizer::new(self.config.fallback_passages).answer(&fused)
            }
        };

        let passages = fused
            .top(self.config.max_passages_in_prompt)
            .iter()
            .map(|f| PassageView::from(&f.passage))
            .collect();

        info!("Pipeline query processing completed");

        Ok(PipelineResponse {
            query: query.to_string(),
            passages,
            supplementary_context: supplementary,
            answer,
            status: PipelineStatus::Success,
        })
    }

    /// Expand, retrieve and fuse, without synthesis.
    ///
    /// # Errors
    ///
    /// Only an empty or whitespace-only query is rejected.
    #[instrument(skip(self), fields(pipeline = "FusionPipeline"))]
    pub async fn retrieve_only(&self, query: &str) -> Result<FusedResult> {
        let normalized = validate_query(query)?;
        Ok(self.fuse(normalized).await)
    }

    async fn fuse(&self, query: &str) -> FusedResult {
        let queries = match self.expander.expand(query).await {
            Ok(queries) => queries,
            Err(e) => {
                warn!("Query expansion failed ({}), using textual variants", e);
                RuleBasedExpander::new()
                    .with_max_queries(self.config.max_expanded_queries)
                    .variants(query)
            }
        };
        debug!("Expanded into {} queries ({:?})", queries.len(), queries.source());

        let ranked_lists = self.retriever.retrieve_all(&queries, self.config.top_k).await;
        let fused = self.fusion.fuse(&ranked_lists);

        info!(
            "Fused {} lists into {} passages ({} candidates)",
            fused.lists_fused,
            fused.len(),
            fused.candidates_seen
        );
        fused
    }

    async fn lookup_context(&self, query: &str) -> Option<SupplementaryContext> {
        let provider = self.context_provider.as_ref()?;

        match tokio::time::timeout(self.config.context_timeout(), provider.lookup(query)).await {
            Ok(Ok(context)) if context.is_empty() => None,
            Ok(Ok(context)) => Some(context),
            Ok(Err(e)) => {
                warn!("{} lookup failed: {}", provider.name(), e);
                None
            }
            Err(_) => {
                warn!("{} lookup timed out", provider.name());
                None
            }
        }
    }
}

fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ContrailError::validation("Query cannot be empty"));
    }
    Ok(trimmed)
}

/// Builder for [`FusionPipeline`].
///
/// The embedder and index are required. Given a language model, expansion
/// and synthesis are model-backed with local fallbacks; without one the
/// pipeline uses rule-based expansion and context-only answers.
#[derive(Debug, Default)]
pub struct FusionPipelineBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn SimilarityIndex>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    synthesis_model: Option<Arc<dyn LanguageModel>>,
    expander: Option<Arc<dyn QueryExpander>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
    context_provider: Option<Arc<dyn ContextProvider>>,
    config: Option<RetrievalConfig>,
}

impl FusionPipelineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query embedder.
    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the similarity index.
    #[must_use]
    pub fn index(mut self, index: Arc<dyn SimilarityIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the model used for expansion, and for synthesis unless overridden.
    #[must_use]
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set a separate model for synthesis.
    #[must_use]
    pub fn synthesis_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.synthesis_model = Some(model);
        self
    }

    /// Replace the query expander.
    #[must_use]
    pub fn expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Replace the answer synthesizer.
    #[must_use]
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Set the supplementary context provider.
    #[must_use]
    pub fn context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = Some(provider);
        self
    }

    /// Set the pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Fails when the embedder or index is missing, or the configuration
    /// does not validate.
    pub fn build(self) -> Result<FusionPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| ContrailError::configuration("Embedder is required"))?;
        let index = self
            .index
            .ok_or_else(|| ContrailError::configuration("Similarity index is required"))?;

        let config = self.config.unwrap_or_default();
        config.validate()?;

        let expander: Arc<dyn QueryExpander> = match (self.expander, &self.language_model) {
            (Some(expander), _) => expander,
            (None, Some(model)) => Arc::new(FallbackExpander::with_rule_based(
                Arc::clone(model),
                config.max_expanded_queries,
                config.expansion_timeout(),
            )),
            (None, None) => Arc::new(
                RuleBasedExpander::new().with_max_queries(config.max_expanded_queries),
            ),
        };

        let synthesis_model = self.synthesis_model.or(self.language_model);
        let synthesizer: Arc<dyn AnswerSynthesizer> = match (self.synthesizer, synthesis_model) {
            (Some(synthesizer), _) => synthesizer,
            (None, Some(model)) => Arc::new(FallbackSynthesizer::with_context_only(
                model,
                config.synthesis_timeout(),
                config.fallback_passages,
            )),
            (None, None) => Arc::new(ContextOnlySynthesizer::new(config.fallback_passages)),
        };

        Ok(FusionPipeline {
            expander,
            retriever: VectorRetriever::new(embedder, index)
                .with_timeout(config.retrieval_timeout()),
            fusion: ReciprocalRankFusion::new(config.rrf_k, config.max_docs_for_context),
            assembler: ContextAssembler::new(config.max_passages_in_prompt),
            synthesizer,
            context_provider: self.context_provider,
            config,
        })
    }
}
