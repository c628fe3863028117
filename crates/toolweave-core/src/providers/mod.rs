//! LLM Provider implementations
//!
//! ## Architecture
//!
//! All real providers go through the `genai` crate, which handles:
//! - Streaming SSE parsing
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, etc.)
//! - Tool calling
//!
//! Providers not natively in genai (Azure, OpenRouter, Mistral) are handled
//! via genai's `ServiceTargetResolver` using OpenAI-compatible protocols.
//!
//! The `MockProvider` plays scripted replies for tests.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

// Core traits and types
pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{is_context_overflow_message, ProviderError, ProviderResult};

// The main provider - handles all LLM providers via genai
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported, provider_env_key, ProviderConfig};

// Mock provider for testing
pub use mock::{MockFailure, MockMode, MockProvider, MockReply, MockRequest};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing `MockProvider`; every other ID goes through
/// `GenaiProvider`, with unknown IDs treated as OpenAI-compatible endpoints.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => {
            if !GenaiProvider::supports(provider_id) {
                logger.warn(&format!(
                    "[providers] Unknown provider '{}', assuming an OpenAI-compatible endpoint",
                    provider_id
                ));
            }
            Arc::new(GenaiProvider::new(provider_id, logger))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{CaptureLogger, LogLevel};

    #[test]
    fn test_create_provider() {
        let logger = Arc::new(CaptureLogger::new());

        assert_eq!(create_provider("mock", logger.clone()).name(), "mock");
        assert_eq!(create_provider("anthropic", logger.clone()).name(), "anthropic");
        assert!(!logger.contains(LogLevel::Warn, "Unknown provider"));

        assert_eq!(create_provider("acme", logger.clone()).name(), "acme");
        assert!(logger.contains(LogLevel::Warn, "Unknown provider 'acme'"));
    }
}
