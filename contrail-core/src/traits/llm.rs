//! Generative model trait.
//!
//! The pipeline uses a generative model in two modes, query expansion and
//! answer synthesis. Both reduce to a single prompt-in, text-out completion.

use async_trait::async_trait;

use crate::Result;

/// A text completion capability backed by a generative model.
///
/// # Examples
///
/// ```rust,no_run
/// use contrail_core::traits::LanguageModel;
/// use contrail_core::Result;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct EchoModel;
///
/// #[async_trait]
/// impl LanguageModel for EchoModel {
///     async fn complete(&self, prompt: &str) -> Result<String> {
///         Ok(prompt.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + std::fmt::Debug {
    /// Complete `prompt` and return the model's text response.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, provider rejection, or a
    /// response without text content.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get a human-readable name for this model.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Identifier of the underlying model, when known.
    fn model_name(&self) -> Option<&str> {
        None
    }
}
