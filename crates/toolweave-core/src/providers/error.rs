//! Provider error types

use thiserror::Error;

/// Phrases providers use when a request does not fit the model's context
const CONTEXT_OVERFLOW_PATTERNS: &[&str] = &[
    "prompt is too long",
    "input is too long",
    "maximum context length",
    "context length exceeded",
    "context_length_exceeded",
    "exceeds the context window",
    "context window of this model",
    "too many tokens",
    "token limit exceeded",
];

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// The request did not fit the model's context window
    #[error("{provider} rejected the request as too large: {message}")]
    ContextOverflow { provider: String, message: String },

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error, recognizing context overflow from the message text
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        if is_context_overflow_message(&message) {
            return Self::ContextOverflow { provider, message };
        }
        Self::ApiError {
            provider,
            status,
            message,
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the request has to shrink before it can succeed
    pub fn is_context_overflow(&self) -> bool {
        matches!(self, Self::ContextOverflow { .. })
    }
}

/// Check if an error message indicates a context window overflow
pub fn is_context_overflow_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONTEXT_OVERFLOW_PATTERNS.iter().any(|p| lower.contains(p))
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_overflow_detection() {
        let err = ProviderError::api_error(
            "anthropic",
            400,
            "prompt is too long: 215000 tokens > 200000 maximum",
        );
        assert!(err.is_context_overflow());

        let err = ProviderError::api_error(
            "openai",
            400,
            "This model's Maximum Context Length is 128000 tokens",
        );
        assert!(err.is_context_overflow());

        let err = ProviderError::api_error("anthropic", 529, "Overloaded");
        assert!(!err.is_context_overflow());
        assert_eq!(err.to_string(), "anthropic API error (529): Overloaded");
    }
}
