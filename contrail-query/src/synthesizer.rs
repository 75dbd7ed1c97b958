//! Answer synthesis from assembled context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contrail_core::{ContrailError, FusedResult, LanguageModel, Result};
use tracing::{debug, info, instrument, warn};

use crate::assembler::{AssembledContext, KNOWLEDGE_GRAPH_LABEL};

/// Opening line of the context-only answer.
pub const FALLBACK_APOLOGY: &str = "I apologize, but I encountered an error while generating a response. Here's what I found in our policy documents:";

const FALLBACK_EXCERPT_CHARS: usize = 200;

const ROLE_FRAMING: &str = "You are a helpful airline customer service assistant. Based on the following context from airline policy documents and knowledge graph data, provide a comprehensive and accurate answer to the user's question.";

const INSTRUCTIONS: &[&str] = &[
    "1. Answer the question based on BOTH the policy documents and knowledge graph information",
    "2. Be specific and include relevant details like fees, timeframes, requirements, relationships, etc.",
    "3. If the context doesn't contain enough information to fully answer the question, clearly state what information is missing",
    "4. Use a helpful and professional tone",
    "5. Structure your response clearly with bullet points or numbered lists when appropriate",
    "6. Include contact information if mentioned in the context",
    "7. Use knowledge graph relationships to provide additional context and connections",
];

/// Produces the final answer for a query.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync + std::fmt::Debug {
    /// Answer `query` from the fused passages and their formatted context.
    ///
    /// # Errors
    ///
    /// Model-backed synthesizers fail when the model call fails or times out.
    async fn synthesize(
        &self,
        query: &str,
        fused: &FusedResult,
        context: &AssembledContext,
    ) -> Result<String>;

    /// Get a human-readable name for this synthesizer.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Synthesizes answers with a generative model.
#[derive(Debug, Clone)]
pub struct LlmSynthesizer {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl LlmSynthesizer {
    /// Creates a synthesizer with a 60 second timeout.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the synthesis prompt.
    pub fn build_prompt(query: &str, context: &AssembledContext) -> String {
        let question = format!("USER QUESTION: {query}");

        let mut parts: Vec<&str> = vec![
            ROLE_FRAMING,
            "",
            "CONTEXT FROM POLICY DOCUMENTS:",
            context.passages.as_str(),
        ];

        if context.has_knowledge_graph() {
            parts.extend(["", KNOWLEDGE_GRAPH_LABEL, context.knowledge_graph.as_str()]);
        }

        parts.extend(["", question.as_str(), "", "INSTRUCTIONS:"]);
        parts.extend(INSTRUCTIONS);
        parts.extend(["", "Please provide a detailed and helpful response:"]);

        parts.join("\n")
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmSynthesizer {
    #[instrument(skip(self, fused, context), fields(synthesizer = "LlmSynthesizer"))]
    async fn synthesize(
        &self,
        query: &str,
        fused: &FusedResult,
        context: &AssembledContext,
    ) -> Result<String> {
        let prompt = Self::build_prompt(query, context);
        debug!(
            "Built synthesis prompt with {} characters from {} passages",
            prompt.len(),
            fused.len()
        );

        let answer = tokio::time::timeout(self.timeout, self.model.complete(&prompt))
            .await
            .map_err(|_| ContrailError::timeout("answer synthesis"))??;

        info!("Generated response with {} characters", answer.len());
        Ok(answer)
    }
}

/// Answers by quoting the leading passages, without a model.
#[derive(Debug, Clone)]
pub struct ContextOnlySynthesizer {
    max_passages: usize,
}

impl Default for ContextOnlySynthesizer {
    fn default() -> Self {
        Self { max_passages: 2 }
    }
}

impl ContextOnlySynthesizer {
    /// Creates a synthesizer quoting at most `max_passages` passages.
    #[must_use]
    pub fn new(max_passages: usize) -> Self {
        Self { max_passages }
    }

    /// The apology line followed by one excerpt per leading passage.
    pub fn answer(&self, fused: &FusedResult) -> String {
        let excerpts: Vec<String> = fused
            .top(self.max_passages)
            .iter()
            .map(|f| {
                let excerpt: String = f
                    .passage
                    .content()
                    .chars()
                    .take(FALLBACK_EXCERPT_CHARS)
                    .collect();
                format!("From {}: {}...", f.passage.source(), excerpt)
            })
            .collect();

        format!("{FALLBACK_APOLOGY}\n\n{}", excerpts.join("\n\n"))
    }
}

#[async_trait]
impl AnswerSynthesizer for ContextOnlySynthesizer {
    async fn synthesize(
        &self,
        _query: &str,
        fused: &FusedResult,
        _context: &AssembledContext,
    ) -> Result<String> {
        Ok(self.answer(fused))
    }
}

/// Tries a primary synthesizer and falls back to a secondary one on error.
#[derive(Debug, Clone)]
pub struct FallbackSynthesizer {
    primary: Arc<dyn AnswerSynthesizer>,
    fallback: Arc<dyn AnswerSynthesizer>,
}

impl FallbackSynthesizer {
    /// Creates the decorator.
    pub fn new(primary: Arc<dyn AnswerSynthesizer>, fallback: Arc<dyn AnswerSynthesizer>) -> Self {
        Self { primary, fallback }
    }

    /// Model-backed synthesis with the context-only answer as fallback.
    pub fn with_context_only(
        model: Arc<dyn LanguageModel>,
        timeout: Duration,
        fallback_passages: usize,
    ) -> Self {
        Self::new(
            Arc::new(LlmSynthesizer::new(model).with_timeout(timeout)),
            Arc::new(ContextOnlySynthesizer::new(fallback_passages)),
        )
    }
}

#[async_trait]
impl AnswerSynthesizer for FallbackSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        fused: &FusedResult,
        context: &AssembledContext,
    ) -> Result<String> {
        match self.primary.synthesize(query, fused, context).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!(
                    "{} failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback.synthesize(query, fused, context).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrail_core::{FusedPassage, Passage};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(ContrailError::llm("quota exceeded"))
        }
    }

    #[derive(Debug)]
    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn fused() -> FusedResult {
        let long = "x".repeat(250);
        FusedResult {
            passages: vec![
                FusedPassage {
                    passage: Passage::new(long).with_metadata("filename", "refunds.pdf"),
                    score: 0.03,
                },
                FusedPassage {
                    passage: Passage::new("Short text.").with_metadata("filename", "pets.md"),
                    score: 0.02,
                },
                FusedPassage {
                    passage: Passage::new("Third."),
                    score: 0.01,
                },
            ],
            lists_fused: 2,
            candidates_seen: 3,
        }
    }

    #[test]
    fn test_prompt_without_graph_block() {
        let context = AssembledContext {
            passages: "Document: a\nContent: b".to_string(),
            knowledge_graph: String::new(),
        };
        let prompt = LlmSynthesizer::build_prompt("Can I get a refund?", &context);

        assert!(prompt.starts_with(ROLE_FRAMING));
        assert!(prompt.contains("CONTEXT FROM POLICY DOCUMENTS:\nDocument: a\nContent: b\n\nUSER QUESTION: Can I get a refund?"));
        assert!(!prompt.contains(KNOWLEDGE_GRAPH_LABEL));
        assert!(prompt.contains("7. Use knowledge graph relationships"));
        assert!(prompt.ends_with("Please provide a detailed and helpful response:"));
    }

    #[test]
    fn test_prompt_with_graph_block() {
        let context = AssembledContext {
            passages: "P".to_string(),
            knowledge_graph: "ENTITIES FOUND:".to_string(),
        };
        let prompt = LlmSynthesizer::build_prompt("q", &context);
        assert!(prompt.contains("P\n\nCONTEXT FROM KNOWLEDGE GRAPH:\nENTITIES FOUND:\n\nUSER QUESTION: q"));
    }

    #[test]
    fn test_context_only_answer() {
        let answer = ContextOnlySynthesizer::default().answer(&fused());

        let expected = format!(
            "{FALLBACK_APOLOGY}\n\nFrom refunds.pdf: {}...\n\nFrom pets.md: Short text....",
            "x".repeat(200)
        );
        assert_eq!(answer, expected);
    }

    #[tokio::test]
    async fn test_llm_synthesizer_returns_model_text() {
        let synthesizer = LlmSynthesizer::new(std::sync::Arc::new(EchoModel));
        let context = AssembledContext {
            passages: "P".to_string(),
            knowledge_graph: String::new(),
        };
        let answer = synthesizer.synthesize("q", &fused(), &context).await.unwrap();
        assert!(answer.contains("USER QUESTION: q"));
    }

    #[tokio::test]
    async fn test_fallback_on_model_failure() {
        let synthesizer =
            FallbackSynthesizer::with_context_only(Arc::new(FailingModel), Duration::from_secs(1), 2);

        let answer = synthesizer
            .synthesize("q", &fused(), &AssembledContext::default())
            .await
            .unwrap();

        assert!(answer.starts_with(FALLBACK_APOLOGY));
        assert!(answer.contains("From pets.md: Short text...."));
        assert!(!answer.contains("Third."));
    }
}
