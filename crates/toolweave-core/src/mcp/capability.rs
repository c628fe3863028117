//! What an MCP server offers

use rmcp::model::Tool as McpTool;
use serde_json::Value;

use crate::tools::ToolDescriptor;

/// One capability discovered on a server
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// A readable resource
    Resource { uri: String, name: String },
    /// An invocable tool
    Tool(ToolDescriptor),
    /// A prompt template
    Prompt {
        name: String,
        description: Option<String>,
    },
}

impl Capability {
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::Resource { .. } => "resource",
            Capability::Tool(_) => "tool",
            Capability::Prompt { .. } => "prompt",
        }
    }

    /// The tool payload, if this is a tool
    pub fn into_tool(self) -> Option<ToolDescriptor> {
        match self {
            Capability::Tool(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

impl From<&McpTool> for ToolDescriptor {
    fn from(tool: &McpTool) -> Self {
        // input_schema is Arc<JsonObject>
        let schema = Value::Object(tool.input_schema.as_ref().clone());
        ToolDescriptor::new(
            tool.name.to_string(),
            tool.description.as_deref().unwrap_or_default(),
        )
        .with_schema(&schema)
    }
}
