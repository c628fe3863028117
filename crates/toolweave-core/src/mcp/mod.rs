//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to tool servers.
//! Supports child-process stdio, streamable HTTP and Unix socket transports.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolweave_core::mcp::McpClient;
//! use toolweave_core::tools::ToolProvider;
//!
//! let mut cmd = tokio::process::Command::new("docker");
//! cmd.args(["run", "--rm", "-i", "mcp/time"]);
//! let client = McpClient::connect_stdio("time", cmd, logger).await?;
//!
//! // Only tool capabilities are surfaced
//! let tools = client.discover().await?;
//!
//! let output = client.invoke("get_current_time", json!({
//!     "timezone": "Europe/Warsaw"
//! })).await?;
//! ```

mod capability;
mod client;
mod content;

pub use capability::Capability;
pub use client::{McpClient, McpError, McpResult};
pub use content::{detect_image_bytes, detect_image_format, normalize_call_result, strip_data_url};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{Tool as McpTool, CallToolResult as McpToolResult};
