//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::{ChatMessage, ContentPart, MessageRole};

/// Tool definition sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// One piece of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text
    Text { text: String },
    /// Base64 encoded image
    Image {
        #[serde(rename = "mediaType")]
        media_type: String,
        data: String,
    },
    /// Structured output
    Json { value: Value },
}

impl ToolContent {
    /// Create a text content item
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }

    /// Render the item as text for models that only accept strings
    pub fn render(&self) -> String {
        match self {
            ToolContent::Text { text } => text.clone(),
            ToolContent::Image { media_type, data } => {
                format!("[image: {}, {} bytes base64]", media_type, data.len())
            }
            ToolContent::Json { value } => value.to_string(),
        }
    }
}

/// Tool result to send back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    #[serde(rename = "callId")]
    pub call_id: String,
    /// The result content
    pub content: Vec<ToolContent>,
    /// Whether this result represents an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(call_id: impl Into<String>, content: Vec<ToolContent>) -> Self {
        Self {
            call_id: call_id.into(),
            content,
            is_error: false,
        }
    }

    /// Create an error tool result carrying an explanatory message
    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: vec![ToolContent::text(error)],
            is_error: true,
        }
    }

    /// Render all content items as one string
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ToolContent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert into a `tool_result` content block
    pub fn into_part(self) -> ContentPart {
        ContentPart::ToolResult {
            tool_use_id: self.call_id,
            content: self.content,
            is_error: self.is_error,
        }
    }

    /// Wrap the result in a user message of its own
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::with_parts(MessageRole::User, vec![self.into_part()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_creation() {
        let tool = Tool::new("get_weather", "Get the current weather")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                },
                "required": ["location"]
            }));

        assert_eq!(tool.name, "get_weather");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_tool_result() {
        let success = ToolResult::success("call_123", vec![ToolContent::text("72F, sunny")]);
        assert!(!success.is_error);
        assert_eq!(success.text(), "72F, sunny");

        let error = ToolResult::error("call_456", "Location not found");
        assert!(error.is_error);

        let msg = error.into_message();
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.tool_result_ids(), vec!["call_456"]);
    }

    #[test]
    fn test_content_rendering() {
        let image = ToolContent::Image {
            media_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        };
        assert_eq!(image.render(), "[image: image/png, 8 bytes base64]");

        let structured = ToolContent::Json { value: json!({"ok": true}) };
        assert_eq!(structured.render(), "{\"ok\":true}");
    }
}
