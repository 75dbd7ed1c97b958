//! Error types for the Contrail engine.
//!
//! Every external call site in the retrieval pipeline converts its failure
//! into one of these variants before deciding whether to recover locally.

use thiserror::Error;

/// Core error types for the Contrail engine.
#[derive(Error, Debug)]
pub enum ContrailError {
    /// I/O related errors (configuration files, network sockets, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding generation errors
    #[error("Embedding error: {message}")]
    Embedding {
        /// Detailed error message
        message: String,
    },

    /// Similarity index query errors
    #[error("Similarity index error: {message}")]
    SimilarityIndex {
        /// Detailed error message
        message: String,
    },

    /// Generative model errors
    #[error("LLM error: {message}")]
    Llm {
        /// Detailed error message
        message: String,
    },

    /// Supplementary context provider errors
    #[error("Context provider error: {message}")]
    ContextProvider {
        /// Detailed error message
        message: String,
    },

    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed error message
        message: String,
    },

    /// Operation timeout errors
    #[error("Timeout: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
    },
}

impl ContrailError {
    /// Create a new embedding error with a message.
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a new similarity index error with a message.
    pub fn similarity_index<S: Into<String>>(message: S) -> Self {
        Self::SimilarityIndex {
            message: message.into(),
        }
    }

    /// Create a new LLM error with a message.
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Create a new context provider error with a message.
    pub fn context_provider<S: Into<String>>(message: S) -> Self {
        Self::ContextProvider {
            message: message.into(),
        }
    }

    /// Create a new configuration error with a message.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error with a message.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new timeout error with an operation name.
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Check if this error is transient.
    ///
    /// Returns `true` for failures that might succeed on a later request,
    /// such as timeouts, network I/O, or remote service errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Io(_)
                | Self::Embedding { .. }
                | Self::SimilarityIndex { .. }
                | Self::Llm { .. }
        )
    }

    /// Check if this error is a client error (4xx-style).
    ///
    /// Returns `true` for errors caused by invalid input or configuration
    /// that won't be fixed by retrying.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Configuration { .. })
    }
}

impl From<toml::de::Error> for ContrailError {
    fn from(error: toml::de::Error) -> Self {
        Self::configuration(format!("Invalid TOML: {error}"))
    }
}

/// Result type alias used throughout the Contrail crates.
pub type Result<T> = std::result::Result<T, ContrailError>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_creation() {
        let err = ContrailError::embedding("Failed to generate embedding");
        assert!(matches!(err, ContrailError::Embedding { .. }));
        assert_eq!(
            err.to_string(),
            "Embedding error: Failed to generate embedding"
        );
    }

    #[test]
    fn test_error_retryable() {
        assert!(ContrailError::timeout("retrieval").is_retryable());
        assert!(ContrailError::llm("503").is_retryable());
        assert!(!ContrailError::validation("empty query").is_retryable());
    }

    #[test]
    fn test_error_client_error() {
        assert!(ContrailError::validation("invalid").is_client_error());
        assert!(ContrailError::configuration("rrf_k must be positive").is_client_error());
        assert!(!ContrailError::timeout("synthesis").is_client_error());
    }

    #[test_case(ContrailError::embedding("e"), "Embedding error: e", true ; "embedding")]
    #[test_case(ContrailError::similarity_index("s"), "Similarity index error: s", true ; "similarity index")]
    #[test_case(ContrailError::llm("l"), "LLM error: l", true ; "llm")]
    #[test_case(ContrailError::context_provider("c"), "Context provider error: c", false ; "context provider")]
    #[test_case(ContrailError::configuration("bad"), "Configuration error: bad", false ; "configuration")]
    #[test_case(ContrailError::validation("v"), "Validation error: v", false ; "validation")]
    #[test_case(ContrailError::timeout("synthesis"), "Timeout: synthesis", true ; "timeout")]
    fn test_error_kinds(err: ContrailError, display: &str, retryable: bool) {
        assert_eq!(err.to_string(), display);
        assert_eq!(err.is_retryable(), retryable);
    }
}
