//! The result object handed to the chatbot service layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{DEFAULT_PREVIEW_CHARS, Passage, SupplementaryContext};

/// Fixed answer returned when retrieval finds nothing.
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found.";

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// At least one passage was retrieved and an answer was produced.
    Success,
    /// Fusion yielded zero passages.
    NoResults,
}

impl PipelineStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoResults => "no_results",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passage as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageView {
    /// Full passage text.
    pub content: String,
    /// Source metadata.
    pub metadata: HashMap<String, Value>,
    /// Shortened text for display.
    pub preview: String,
}

impl From<&Passage> for PassageView {
    fn from(passage: &Passage) -> Self {
        Self {
            content: passage.content().to_string(),
            metadata: passage.metadata().clone(),
            preview: passage.preview(DEFAULT_PREVIEW_CHARS),
        }
    }
}

/// The well-formed result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    /// The query as received.
    pub query: String,
    /// Top fused passages used as context.
    pub passages: Vec<PassageView>,
    /// Knowledge-graph facts, when the lookup produced any.
    pub supplementary_context: Option<SupplementaryContext>,
    /// Final answer text.
    pub answer: String,
    /// Outcome of the run.
    pub status: PipelineStatus,
}

impl PipelineResponse {
    /// The terminal response for a query whose retrieval found nothing.
    pub fn no_results<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            passages: Vec::new(),
            supplementary_context: None,
            answer: NO_RESULTS_MESSAGE.to_string(),
            status: PipelineStatus::NoResults,
        }
    }

    /// Whether the run produced an answer from retrieved passages.
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}
