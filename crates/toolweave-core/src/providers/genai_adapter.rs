//! Adapter between toolweave types and genai types
//!
//! Conversation history stores tool invocations and tool results as
//! content blocks inside user/assistant messages. genai models them as
//! dedicated messages, so a single history entry may expand into several
//! genai messages here.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent, ContentPart as GenaiPart,
    Tool as GenaiTool, ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall, ToolContent};

use super::error::{ProviderError, ProviderResult};
use super::traits::{ProviderModelConfig, StreamChatOptions};

// ============================================================================
// Message Conversion: toolweave -> genai
// ============================================================================

fn text_message(role: MessageRole, text: String) -> GenaiMessage {
    match role {
        MessageRole::User => GenaiMessage::user(text),
        MessageRole::Assistant => GenaiMessage::assistant(text),
    }
}

/// Convert one history entry into genai messages
///
/// Text blocks come first, then the assistant's tool calls, then one tool
/// response message per tool result. Images returned by tools cannot ride
/// in a tool response, so they follow as binary parts of one user message.
pub fn to_genai_message(msg: ChatMessage) -> ProviderResult<Vec<GenaiMessage>> {
    let parts = match msg.content {
        MessageContent::Text(text) => return Ok(vec![text_message(msg.role, text)]),
        MessageContent::Parts(parts) => parts,
    };

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    let mut responses = Vec::new();
    let mut images = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text } => texts.push(text),
            ContentPart::ToolUse { id, name, input } => {
                calls.push(to_genai_tool_call(&ToolCall::new(id, name, input))?);
            }
            ContentPart::ToolResult { tool_use_id, content, is_error } => {
                responses.push(GenaiToolResponse::new(&tool_use_id, render_tool_content(&content, is_error)));
                images.extend(tool_images(&tool_use_id, content));
            }
        }
    }

    let mut out = Vec::new();
    let text = texts.join("\n");
    if !text.trim().is_empty() {
        out.push(text_message(msg.role, text));
    }
    if !calls.is_empty() {
        out.push(GenaiMessage::from(calls));
    }
    out.extend(responses.into_iter().map(GenaiMessage::from));
    if !images.is_empty() {
        let mut parts = vec![GenaiPart::from_text("Images returned by the tool calls above:")];
        parts.extend(images);
        out.push(GenaiMessage::user(parts));
    }
    Ok(out)
}

fn tool_images(tool_use_id: &str, content: Vec<ToolContent>) -> Vec<GenaiPart> {
    content
        .into_iter()
        .filter_map(|item| match item {
            ToolContent::Image { media_type, data } => Some(GenaiPart::from_binary_base64(
                media_type,
                data,
                Some(tool_use_id.to_string()),
            )),
            _ => None,
        })
        .collect()
}

/// Convert a message window to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    let mut out = Vec::with_capacity(messages.len());
    for msg in messages {
        out.extend(to_genai_message(msg)?);
    }
    Ok(out)
}

/// Flatten tool output into the string genai tool responses carry
pub fn render_tool_content(content: &[ToolContent], is_error: bool) -> String {
    let body = content
        .iter()
        .map(ToolContent::render)
        .collect::<Vec<_>>()
        .join("\n");
    if is_error {
        format!("Error: {}", body)
    } else {
        body
    }
}

fn to_genai_tool_call(call: &ToolCall) -> ProviderResult<GenaiToolCall> {
    // Built through serde so optional fields keep their defaults
    let tc = serde_json::from_value(json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.input,
    }))?;
    Ok(tc)
}

// ============================================================================
// Tool Conversion: toolweave -> genai
// ============================================================================

/// Convert a tool definition to a genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

/// Convert tool definitions to genai tools
pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: toolweave -> genai
// ============================================================================

/// Convert StreamChatOptions to genai ChatOptions
pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls are only reported at stream end when captured
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> toolweave
// ============================================================================

/// Convert genai ToolCall to our ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

/// Convert a genai stream event into zero or more chunks
///
/// Text deltas pass through; every captured tool call is emitted at the end
/// of the stream.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<ProviderResult<StreamChunk>> {
    match event {
        ChatStreamEvent::Chunk(chunk) if !chunk.content.is_empty() => {
            vec![Ok(StreamChunk::Text { text: chunk.content })]
        }
        ChatStreamEvent::End(end) => match end.captured_tool_calls() {
            Some(tool_calls) => tool_calls
                .iter()
                .map(|tc| Ok(StreamChunk::ToolCall { tool_call: from_genai_tool_call(tc) }))
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "anthropic", "openai", "openrouter")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

/// Environment variable holding the API key for a provider
pub fn provider_env_key(provider: &str) -> String {
    match provider.to_lowercase().as_str() {
        "openai" => "OPENAI_API_KEY".to_string(),
        "anthropic" => "ANTHROPIC_API_KEY".to_string(),
        "gemini" | "google" => "GEMINI_API_KEY".to_string(),
        "groq" => "GROQ_API_KEY".to_string(),
        "xai" => "XAI_API_KEY".to_string(),
        "deepseek" => "DEEPSEEK_API_KEY".to_string(),
        "cohere" => "COHERE_API_KEY".to_string(),
        "fireworks" => "FIREWORKS_API_KEY".to_string(),
        "together" => "TOGETHER_API_KEY".to_string(),
        "azure" => "AZURE_OPENAI_API_KEY".to_string(),
        "openrouter" => "OPENROUTER_API_KEY".to_string(),
        "mistral" => "MISTRAL_API_KEY".to_string(),
        other => format!("{}_API_KEY", other.to_uppercase()),
    }
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client with custom auth and endpoint resolution
///
/// An explicit API key wins; otherwise the provider's environment
/// variable is read when the request is authenticated.
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_provider = config.provider.clone();
    let auth_explicit_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let explicit_key = auth_explicit_key.clone();

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }
                // Keyless providers such as ollama resolve to None
                Ok(std::env::var(provider_env_key(&provider))
                    .ok()
                    .filter(|k| !k.is_empty())
                    .map(AuthData::from_single))
            })
        },
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            Ok(resolve_service_target(&target_provider, target_api_base.as_deref(), target))
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Point a request at the provider's endpoint
///
/// A custom `api_base` applies to every provider. Native providers keep
/// their own adapter; the rest are spoken to as OpenAI-compatible.
fn resolve_service_target(provider: &str, api_base: Option<&str>, target: ServiceTarget) -> ServiceTarget {
    let endpoint = match (provider, api_base) {
        (_, Some(base)) => Endpoint::from_owned(base.to_string()),
        ("openrouter", None) => Endpoint::from_static("https://openrouter.ai/api/v1/"),
        ("mistral", None) => Endpoint::from_static("https://api.mistral.ai/v1/"),
        _ => return target,
    };

    let model = if is_genai_native(provider) {
        target.model
    } else {
        ModelIden::new(AdapterKind::OpenAI, target.model.model_name.clone())
    };

    ServiceTarget {
        endpoint,
        auth: target.auth,
        model,
    }
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(
            provider.to_lowercase().as_str(),
            "azure" | "openrouter" | "mistral"
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::{BinarySource, ChatRole as GenaiRole};

    #[test]
    fn test_plain_message_conversion() {
        let msgs = to_genai_message(ChatMessage::user("Hello, world!")).unwrap();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0].role, GenaiRole::User));
    }

    #[test]
    fn test_tool_round_conversion() {
        let invocation = ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![
                ContentPart::text("Let me check."),
                ContentPart::tool_use("t1", "get_time", json!({"zone": "UTC"})),
            ],
        );
        let msgs = to_genai_message(invocation).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0].role, GenaiRole::Assistant));
        assert!(matches!(msgs[1].role, GenaiRole::Assistant));

        let results = ChatMessage::with_parts(
            MessageRole::User,
            vec![
                ContentPart::tool_result("t1", vec![ToolContent::text("12:00")], false),
                ContentPart::tool_result("t2", vec![ToolContent::text("boom")], true),
            ],
        );
        let msgs = to_genai_message(results).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_images_reach_the_model() {
        let results = ChatMessage::with_parts(
            MessageRole::User,
            vec![ContentPart::tool_result(
                "t1",
                vec![
                    ToolContent::text("screenshot taken"),
                    ToolContent::Image {
                        media_type: "image/png".to_string(),
                        data: "iVBORw0KGgo=".to_string(),
                    },
                ],
                false,
            )],
        );

        let msgs = to_genai_message(results).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0].role, GenaiRole::Tool));
        assert!(matches!(msgs[1].role, GenaiRole::User));

        let binaries = msgs[1].content.binaries();
        assert_eq!(binaries.len(), 1);
        assert_eq!(binaries[0].content_type, "image/png");
        assert!(matches!(&binaries[0].source, BinarySource::Base64(data) if &**data == "iVBORw0KGgo="));
    }

    #[test]
    fn test_text_only_results_add_no_image_message() {
        let results = ChatMessage::with_parts(
            MessageRole::User,
            vec![ContentPart::tool_result("t1", vec![ToolContent::text("12:00")], false)],
        );
        let msgs = to_genai_message(results).unwrap();
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn test_api_base_applies_to_native_providers() {
        let target = || ServiceTarget {
            endpoint: Endpoint::from_static("https://api.anthropic.com/v1/"),
            auth: AuthData::from_single("sk-test"),
            model: ModelIden::new(AdapterKind::Anthropic, "claude-3-5-sonnet-latest"),
        };

        let proxied = resolve_service_target("anthropic", Some("http://localhost:8080/v1/"), target());
        assert_eq!(proxied.endpoint.base_url(), "http://localhost:8080/v1/");
        assert_eq!(proxied.model.adapter_kind, AdapterKind::Anthropic);

        let untouched = resolve_service_target("anthropic", None, target());
        assert_eq!(untouched.endpoint.base_url(), "https://api.anthropic.com/v1/");

        let compat = resolve_service_target("acme", Some("http://acme.local/v1/"), target());
        assert_eq!(compat.endpoint.base_url(), "http://acme.local/v1/");
        assert_eq!(compat.model.adapter_kind, AdapterKind::OpenAI);
    }

    #[test]
    fn test_render_tool_content() {
        let content = vec![ToolContent::text("not found")];
        assert_eq!(render_tool_content(&content, true), "Error: not found");
        assert_eq!(render_tool_content(&content, false), "not found");
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("get_weather", "Get weather for a location")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                }
            }));

        let genai_tool = to_genai_tool(tool);
        assert_eq!(genai_tool.name, "get_weather");
    }

    #[test]
    fn test_provider_detection() {
        assert!(is_genai_native("anthropic"));
        assert!(!is_genai_native("openrouter"));
        assert!(is_genai_supported("openrouter"));
        assert!(!is_genai_supported("unknown_provider"));

        assert_eq!(provider_env_key("anthropic"), "ANTHROPIC_API_KEY");
        assert_eq!(provider_env_key("acme"), "ACME_API_KEY");
    }
}
