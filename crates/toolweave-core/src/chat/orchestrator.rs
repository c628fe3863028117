//! The conversation turn loop
//!
//! A turn appends the user's input, asks the model, runs whatever tools it
//! requests and feeds the results back, until the model answers without
//! tools or the depth limit is reached. Failures never escape a turn; they
//! end it with one of the fixed messages below.

use std::sync::Arc;

use futures::StreamExt;

use crate::config::{ChatSettings, ConfigFile};
use crate::history::HistoryStore;
use crate::logging::Logger;
use crate::providers::{create_provider, Provider, ProviderModelConfig, ProviderResult, StreamChatOptions};
use crate::tools::ToolRegistry;
use crate::types::{ChatMessage, ContentPart, MessageRole, StopReason, StreamChunk, ToolCall, ToolResult};
use crate::{log_debug, log_error, log_info, log_warn};

use super::sink::TurnSink;

/// Returned when the model keeps requesting tools past the depth limit
pub const DEPTH_EXCEEDED_MESSAGE: &str = "Maximum recursion depth reached, stopping tool processing";

/// Returned when the model call fails for any reason other than context size
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error while processing your message.";

/// Returned when the conversation cannot be shrunk enough to continue
pub const CONTEXT_OVERFLOW_MESSAGE: &str =
    "Sorry, the conversation became too long to continue. Please start a new conversation.";

const CONTEXT_RESET_NOTE: &str = "The earlier conversation no longer fit in the model's context window \
     and has been cleared. Please answer the user's most recent message below.";

/// New input for a turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    /// Text typed by the user
    Text(String),
    /// Pre-built messages, appended in order
    Messages(Vec<ChatMessage>),
}

impl TurnInput {
    fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            TurnInput::Text(text) => vec![ChatMessage::user(text)],
            TurnInput::Messages(messages) => messages,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            TurnInput::Text(text) => text.trim().is_empty(),
            TurnInput::Messages(messages) => messages.is_empty(),
        }
    }
}

impl From<&str> for TurnInput {
    fn from(text: &str) -> Self {
        TurnInput::Text(text.to_string())
    }
}

impl From<String> for TurnInput {
    fn from(text: String) -> Self {
        TurnInput::Text(text)
    }
}

impl From<Vec<ChatMessage>> for TurnInput {
    fn from(messages: Vec<ChatMessage>) -> Self {
        TurnInput::Messages(messages)
    }
}

/// One completed model reply
#[derive(Debug, Default)]
struct ModelReply {
    text: String,
    calls: Vec<ToolCall>,
}

impl ModelReply {
    /// Nothing worth storing; providers reject blank assistant turns
    fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.text.trim().is_empty()
    }

    fn stop_reason(&self) -> StopReason {
        if self.calls.is_empty() {
            StopReason::EndTurn
        } else {
            StopReason::ToolUse
        }
    }

    /// The reply as a history entry; tool invocations come last
    fn to_message(&self) -> ChatMessage {
        if self.calls.is_empty() {
            return ChatMessage::assistant(self.text.clone());
        }
        let mut parts = Vec::with_capacity(self.calls.len() + 1);
        if !self.text.trim().is_empty() {
            parts.push(ContentPart::text(self.text.clone()));
        }
        parts.extend(
            self.calls
                .iter()
                .map(|call| ContentPart::tool_use(&call.id, &call.name, call.input.clone())),
        );
        ChatMessage::with_parts(MessageRole::Assistant, parts)
    }
}

/// Drives conversation turns for any number of users
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    history: HistoryStore,
    settings: ChatSettings,
    model: ProviderModelConfig,
    logger: Arc<dyn Logger>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        settings: ChatSettings,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let history = HistoryStore::new(settings.token_ceiling, Arc::clone(&logger));
        Self {
            provider,
            registry,
            history,
            settings,
            model,
            logger,
        }
    }

    /// Build an orchestrator for the provider and limits in a config file
    pub fn from_config(config: &ConfigFile, registry: Arc<ToolRegistry>, logger: Arc<dyn Logger>) -> Self {
        let provider = create_provider(&config.provider.id, Arc::clone(&logger));
        Self::new(
            provider,
            registry,
            config.chat.clone(),
            config.provider.model_config(),
            logger,
        )
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Run one turn and return the text to show the user
    ///
    /// Streamed text is forwarded to `sink` as it arrives. With `reset`, the
    /// user's history is cleared before the input is added. Turns for the
    /// same user must not overlap; callers serialize them.
    pub async fn handle_turn(
        &self,
        user_id: &str,
        input: impl Into<TurnInput>,
        sink: &dyn TurnSink,
        reset: bool,
    ) -> String {
        if reset {
            self.history.reset(user_id);
        }

        let input = input.into();
        if input.is_empty() {
            log_debug!(self.logger, "[Orchestrator] Ignoring empty input from {}", user_id);
            return String::new();
        }

        let mut pending = input.into_messages();
        let mut depth = 0;
        let mut step = 0;
        let mut recovered = false;

        loop {
            self.history.append_many(user_id, pending);

            step += 1;
            sink.on_step_start(step);

            let reply = match self.call_model(user_id, sink).await {
                Ok(reply) => reply,
                Err(e) if e.is_context_overflow() => {
                    if recovered {
                        log_error!(self.logger, "[Orchestrator] Context still too large after reset for {}: {}", user_id, e);
                        return CONTEXT_OVERFLOW_MESSAGE.to_string();
                    }
                    recovered = true;
                    log_warn!(self.logger, "[Orchestrator] Context overflow for {}, resetting history: {}", user_id, e);
                    match self.reseed_history(user_id) {
                        Some(message) => {
                            pending = vec![message];
                            continue;
                        }
                        None => return CONTEXT_OVERFLOW_MESSAGE.to_string(),
                    }
                }
                Err(e) => {
                    log_error!(self.logger, "[Orchestrator] Model call failed for {}: {}", user_id, e);
                    return GENERIC_ERROR_MESSAGE.to_string();
                }
            };

            if reply.is_empty() {
                log_warn!(self.logger, "[Orchestrator] Empty reply for {}, not recorded", user_id);
            } else {
                self.history.append(user_id, reply.to_message());
            }
            sink.on_step_complete(step, &reply.text);

            if reply.stop_reason() == StopReason::EndTurn {
                log_debug!(self.logger, "[Orchestrator] Turn for {} finished after {} steps", user_id, step);
                return reply.text;
            }

            if depth >= self.settings.max_depth {
                log_warn!(
                    self.logger,
                    "[Orchestrator] Maximum recursion depth ({}) reached for {}, stopping tool processing",
                    self.settings.max_depth,
                    user_id
                );
                return DEPTH_EXCEEDED_MESSAGE.to_string();
            }

            log_info!(
                self.logger,
                "[Orchestrator] Processing {} tools at depth {}",
                reply.calls.len(),
                depth
            );
            let results = self.registry.execute_tool_calls(&reply.calls).await;
            pending = vec![ChatMessage::with_parts(
                MessageRole::User,
                results.into_iter().map(ToolResult::into_part).collect(),
            )];
            depth += 1;
        }
    }

    /// Send the windowed history to the model and collect its reply
    async fn call_model(&self, user_id: &str, sink: &dyn TurnSink) -> ProviderResult<ModelReply> {
        let window = self.history.read(user_id, Some(self.settings.history_window));
        let options = StreamChatOptions::new()
            .with_system(&self.settings.system_prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_tools(self.registry.llm_tools());

        log_debug!(
            self.logger,
            "[Orchestrator] Calling {} with {} messages for {}",
            self.provider.name(),
            window.len(),
            user_id
        );

        let mut stream = self.provider.stream_chat(window, self.model.clone(), options).await?;

        let mut reply = ModelReply::default();
        while let Some(chunk) = stream.next().await {
            match chunk? {
                StreamChunk::Text { text } => {
                    sink.on_text(&text);
                    reply.text.push_str(&text);
                }
                StreamChunk::ToolCall { tool_call } => reply.calls.push(tool_call),
            }
        }
        Ok(reply)
    }

    /// Clear the user's history, keeping only their latest message
    fn reseed_history(&self, user_id: &str) -> Option<ChatMessage> {
        let latest = self
            .history
            .read(user_id, None)
            .into_iter()
            .rev()
            .find(ChatMessage::is_user_authored);
        self.history.reset(user_id);

        let latest = latest?;
        Some(ChatMessage::with_parts(
            MessageRole::User,
            vec![
                ContentPart::text(CONTEXT_RESET_NOTE),
                ContentPart::text(latest.text_content()),
            ],
        ))
    }
}
