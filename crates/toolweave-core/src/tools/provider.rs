//! Tool provider seam
//!
//! A `ToolProvider` is one connection to something that hosts tools. The
//! registry only ever talks to this trait; `McpClient` is the production
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mcp::McpResult;
use crate::types::{Tool, ToolContent, ToolResult};

/// A tool as advertised by its provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within the registry
    pub name: String,
    /// What the tool does, shown to the model
    pub description: String,
    /// Input schema: `{ "type": "object", "properties": ..., "required": [...] }`
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a descriptor that takes no arguments
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: normalize_schema(&Value::Null),
        }
    }

    /// Set the input schema; it is normalized on the way in
    pub fn with_schema(mut self, schema: &Value) -> Self {
        self.input_schema = normalize_schema(schema);
        self
    }

    /// Definition sent to the model
    pub fn to_tool(&self) -> Tool {
        Tool::new(&self.name, &self.description).with_schema(self.input_schema.clone())
    }
}

/// Reduce a provider schema to an object schema with properties and required fields
pub fn normalize_schema(schema: &Value) -> Value {
    let properties = schema
        .get("properties")
        .filter(|p| p.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}));
    let required = schema
        .get("required")
        .filter(|r| r.is_array())
        .cloned()
        .unwrap_or_else(|| json!([]));

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Output of a successful tool invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<ToolContent>,
}

impl ToolOutput {
    pub fn new(content: Vec<ToolContent>) -> Self {
        Self { content }
    }

    /// Output consisting of a single text item
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ToolContent::text(text)])
    }

    /// Attach the output to the invocation it answers
    pub fn into_result(self, call_id: impl Into<String>) -> ToolResult {
        ToolResult::success(call_id, self.content)
    }
}

/// One logical connection to a tool-hosting process or endpoint
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Connection identifier
    fn id(&self) -> &str;

    /// Tools the provider currently offers; may be empty
    async fn discover(&self) -> McpResult<Vec<ToolDescriptor>>;

    /// Invoke a tool by name
    ///
    /// Transport failures, malformed responses and tool-reported failures
    /// all surface as errors.
    async fn invoke(&self, name: &str, input: Value) -> McpResult<ToolOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_schema() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": { "timezone": { "type": "string" } },
            "required": ["timezone"],
            "additionalProperties": false
        });
        assert_eq!(
            normalize_schema(&schema),
            json!({
                "type": "object",
                "properties": { "timezone": { "type": "string" } },
                "required": ["timezone"]
            })
        );

        // Missing or malformed pieces fall back to empty ones
        let normalized = normalize_schema(&json!({ "properties": "nope" }));
        assert_eq!(normalized["properties"], json!({}));
        assert_eq!(normalized["required"], json!([]));
    }

    #[test]
    fn test_descriptor_to_tool() {
        let descriptor = ToolDescriptor::new("get_time", "Current time")
            .with_schema(&json!({ "properties": { "zone": { "type": "string" } } }));
        let tool = descriptor.to_tool();

        assert_eq!(tool.name, "get_time");
        assert_eq!(tool.input_schema.unwrap()["type"], "object");
    }

    #[test]
    fn test_output_into_result() {
        let result = ToolOutput::text("12:00").into_result("t1");
        assert_eq!(result.call_id, "t1");
        assert!(!result.is_error);
        assert_eq!(result.text(), "12:00");
    }
}
