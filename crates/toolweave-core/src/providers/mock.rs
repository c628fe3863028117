//! Mock provider for testing
//!
//! Provides deterministic, scripted responses without network dependencies.
//! Every request is recorded so tests can assert on what the model was sent.

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, StreamChunk, ToolCall};

/// How a scripted request fails
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// The request is rejected as too large for the context window
    ContextOverflow,
    /// Any other API failure
    Api { status: u16, message: String },
}

impl MockFailure {
    fn to_error(&self) -> ProviderError {
        match self {
            MockFailure::ContextOverflow => {
                ProviderError::api_error("mock", 400, "prompt is too long: 250000 tokens > 200000 maximum")
            }
            MockFailure::Api { status, message } => ProviderError::api_error("mock", *status, message),
        }
    }
}

/// One scripted model reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Plain text, split into chunks of the configured size
    Text(String),
    /// Text delivered as exactly these chunks
    Chunks(Vec<String>),
    /// Optional text followed by tool calls
    ToolCalls { text: Option<String>, calls: Vec<ToolCall> },
    /// The request fails before any chunk is produced
    Fail(MockFailure),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        MockReply::ToolCalls {
            text: None,
            calls: vec![ToolCall::new(id, name, input)],
        }
    }
}

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user-authored text
    Echo,
    /// Play replies in order; the last one repeats once the script runs out
    Script(Vec<MockReply>),
    /// Request the same tool on every call, with a fresh call id each time
    LoopingTool { name: String, input: serde_json::Value },
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// A request the mock provider received
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<String>,
    pub system: Option<String>,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: MockMode,
    chunk_size: usize,
    calls: AtomicUsize,
    requests: Mutex<Vec<MockRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a new mock provider in the given mode
    pub fn new(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            chunk_size: 10,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Script(vec![MockReply::text(response)]), logger)
    }

    /// Create a provider that plays a script of replies
    pub fn scripted(replies: Vec<MockReply>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Script(replies), logger)
    }

    /// Create a provider that never stops asking for `name`
    pub fn looping_tool(name: impl Into<String>, input: serde_json::Value, logger: Arc<dyn Logger>) -> Self {
        Self::new(
            MockMode::LoopingTool {
                name: name.into(),
                input,
            },
            logger,
        )
    }

    /// Set chunk size for splitting text replies
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Number of stream_chat calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<MockRequest> {
        self.requests.lock().last().cloned()
    }

    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.text_content())
            .find(|t| !t.is_empty())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    /// Split text into chunks
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn reply_for(&self, call_index: usize, messages: &[ChatMessage]) -> MockReply {
        match &self.mode {
            MockMode::Echo => MockReply::Text(format!("Echo: {}", Self::last_user_text(messages))),
            MockMode::Script(replies) => replies
                .get(call_index)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_else(|| MockReply::Text(String::new())),
            MockMode::LoopingTool { name, input } => MockReply::ToolCalls {
                text: None,
                calls: vec![ToolCall::new(format!("call_{}", call_index + 1), name, input.clone())],
            },
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.logger.debug(&format!(
            "[MockProvider] stream_chat call {} with {} messages",
            call_index + 1,
            messages.len()
        ));

        let reply = self.reply_for(call_index, &messages);

        self.requests.lock().push(MockRequest {
            tools: options
                .tools
                .as_ref()
                .map(|tools| tools.iter().map(|t| t.name.clone()).collect())
                .unwrap_or_default(),
            system: options.system,
            messages,
        });

        let chunks: Vec<ProviderResult<StreamChunk>> = match reply {
            MockReply::Text(text) => self
                .split_into_chunks(&text)
                .into_iter()
                .map(|t| Ok(StreamChunk::text(t)))
                .collect(),
            MockReply::Chunks(chunks) => chunks.into_iter().map(|t| Ok(StreamChunk::text(t))).collect(),
            MockReply::ToolCalls { text, calls } => text
                .into_iter()
                .map(StreamChunk::text)
                .chain(calls.into_iter().map(StreamChunk::tool_call))
                .map(Ok)
                .collect(),
            MockReply::Fail(failure) => {
                self.logger.debug(&format!("[MockProvider] Failing request: {:?}", failure));
                return Err(failure.to_error());
            }
        };

        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use futures::StreamExt;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn test_messages(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(content)]
    }

    fn test_config() -> ProviderModelConfig {
        ProviderModelConfig::new("mock-echo")
    }

    async fn collect(stream: StreamResponse) -> Vec<StreamChunk> {
        stream
            .map(|chunk| chunk.expect("chunk should succeed"))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());

        let stream = provider
            .stream_chat(test_messages("Hello, world!"), test_config(), StreamChatOptions::new())
            .await
            .expect("stream should start");

        let text: String = collect(stream).await.iter().filter_map(|c| c.as_text()).collect();
        assert_eq!(text, "Echo: Hello, world!");
    }

    #[tokio::test]
    async fn test_script_plays_in_order_and_repeats_last() {
        let provider = MockProvider::scripted(
            vec![
                MockReply::tool_call("t1", "get_time", json!({})),
                MockReply::Chunks(vec!["It is ".to_string(), "noon.".to_string()]),
            ],
            test_logger(),
        );

        let first = provider
            .stream_chat(test_messages("time?"), test_config(), StreamChatOptions::new())
            .await
            .unwrap();
        let chunks = collect(first).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_tool_call().map(|c| c.id.as_str()), Some("t1"));

        for _ in 0..2 {
            let next = provider
                .stream_chat(test_messages("again"), test_config(), StreamChatOptions::new())
                .await
                .unwrap();
            let texts: Vec<_> = collect(next).await.iter().filter_map(|c| c.as_text().map(String::from)).collect();
            assert_eq!(texts, vec!["It is ", "noon."]);
        }

        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_looping_tool_uses_fresh_ids() {
        let provider = MockProvider::looping_tool("search", json!({"q": "rust"}), test_logger());

        let mut ids = Vec::new();
        for _ in 0..3 {
            let stream = provider
                .stream_chat(test_messages("go"), test_config(), StreamChatOptions::new())
                .await
                .unwrap();
            for chunk in collect(stream).await {
                if let Some(call) = chunk.as_tool_call() {
                    ids.push(call.id.clone());
                }
            }
        }

        assert_eq!(ids, vec!["call_1", "call_2", "call_3"]);
    }

    #[tokio::test]
    async fn test_failures() {
        let provider = MockProvider::scripted(
            vec![
                MockReply::Fail(MockFailure::ContextOverflow),
                MockReply::Fail(MockFailure::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            ],
            test_logger(),
        );

        let err = provider
            .stream_chat(test_messages("a"), test_config(), StreamChatOptions::new())
            .await
            .err()
            .unwrap();
        assert!(err.is_context_overflow());

        let err = provider
            .stream_chat(test_messages("b"), test_config(), StreamChatOptions::new())
            .await
            .err()
            .unwrap();
        assert!(!err.is_context_overflow());
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let provider = MockProvider::fixed("ok", test_logger());
        let options = StreamChatOptions::new()
            .with_system("be brief")
            .with_tools(vec![crate::types::Tool::new("get_time", "Current time")]);

        provider
            .stream_chat(test_messages("hi"), test_config(), options)
            .await
            .unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.tools, vec!["get_time"]);
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn test_chunk_splitting() {
        let provider = MockProvider::echo(test_logger()).with_chunk_size(5);
        let chunks = provider.split_into_chunks("Hello, world!");

        assert_eq!(chunks, vec!["Hello", ", wor", "ld!"]);
    }
}
