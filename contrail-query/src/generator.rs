//! Generative model adapter over the siumai crate.

use async_trait::async_trait;
use tracing::{debug, instrument};

use contrail_core::{ContrailError, LanguageModel, Result};

use siumai::prelude::*;

/// A [`LanguageModel`] backed by a siumai chat client.
///
/// Each completion is sent as a single user message; the text content of
/// the reply is returned as is.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_query::generator::SiumaiLanguageModel;
/// use contrail_core::LanguageModel;
/// use siumai::prelude::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Siumai::builder()
///     .openai()
///     .api_key("your-api-key")
///     .model("gpt-4o-mini")
///     .build()
///     .await?;
///
/// let model = SiumaiLanguageModel::new(client).with_model_name("gpt-4o-mini");
/// let answer = model.complete("What is the checked baggage allowance?").await?;
/// # Ok(())
/// # }
/// ```
pub struct SiumaiLanguageModel {
    client: Siumai,
    model_name: Option<String>,
}

impl std::fmt::Debug for SiumaiLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiumaiLanguageModel")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

impl SiumaiLanguageModel {
    /// Wrap a siumai client.
    pub fn new(client: Siumai) -> Self {
        Self {
            client,
            model_name: None,
        }
    }

    /// Record the model identifier, for logging.
    #[must_use]
    pub fn with_model_name<S: Into<String>>(mut self, model_name: S) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

#[async_trait]
impl LanguageModel for SiumaiLanguageModel {
    #[instrument(skip(self, prompt), fields(model = ?self.model_name))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Sending prompt with {} characters", prompt.len());

        let messages = vec![ChatMessage::user(prompt).build()];
        let response = self
            .client
            .chat(messages)
            .await
            .map_err(|e| ContrailError::llm(format!("Siumai generation failed: {e}")))?;

        match &response.content {
            siumai::MessageContent::Text(text) => Ok(text.clone()),
            _ => Err(ContrailError::llm(
                "Unsupported content type in LLM response",
            )),
        }
    }

    fn name(&self) -> &'static str {
        "SiumaiLanguageModel"
    }

    fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }
}
