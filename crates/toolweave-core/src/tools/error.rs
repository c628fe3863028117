//! Router error types

use thiserror::Error;

use crate::mcp::McpError;

/// Errors raised while routing or invoking a tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// No connection registered a tool with this name
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// The tool is routed to a connection that is no longer present
    #[error("Tool '{tool}' is routed to missing connection '{connection}'")]
    ConnectionMissing { tool: String, connection: String },

    /// The owning connection failed to run the tool
    #[error(transparent)]
    Invocation(#[from] McpError),
}

impl ToolError {
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }
}
