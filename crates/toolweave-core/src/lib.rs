//! Toolweave Core
//!
//! Tool-augmented conversations for chat front-ends.
//! A front-end hands each user message to the [`Orchestrator`], which keeps
//! the per-user history, streams the model's reply and runs any tools the
//! model asks for against the configured tool servers.
//!
//! ## Tool Orchestration
//!
//! The `tools` module routes model tool calls to MCP servers:
//! - Connect to every configured tool server at startup
//! - Register discovered tools, first registrant wins on name clashes
//! - Execute a round of tool calls concurrently and return results to the LLM
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use toolweave_core::{ConsoleLogger, FileConfigProvider, Orchestrator, ToolRegistry};
//!
//! let logger = Arc::new(ConsoleLogger::from_env());
//! let config = FileConfigProvider::user().load()?;
//!
//! let registry = Arc::new(ToolRegistry::new(logger.clone()));
//! let report = registry.connect_all(&config.tool_servers).await;
//!
//! let chat = Orchestrator::from_config(&config, registry, logger);
//! let answer = chat
//!     .handle_turn("user-1", "What time is it in Tokyo?", &|chunk: &str| print!("{}", chunk), false)
//!     .await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod tools;
pub mod history;
pub mod chat;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolCall, ToolContent, ToolResult,
    StopReason, StreamChunk,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, LogLevel};

pub use config::{ChatSettings, ConfigFile, ConfigError, FileConfigProvider, ToolServerConfig, ToolTransport};

pub use providers::{create_provider, Provider, ProviderError, ProviderModelConfig, StreamChatOptions};

pub use tools::{BootstrapReport, ToolDescriptor, ToolError, ToolOutput, ToolProvider, ToolRegistry};

pub use history::HistoryStore;

pub use chat::{Orchestrator, TurnInput, TurnSink};

// MCP client using official rmcp SDK
pub use mcp::{Capability, McpClient, McpError, McpResult};
