//! Core conversation types
//!
//! This module contains the shared types used by the history store,
//! the tool registry and the providers.

mod message;
mod tool;
mod stream;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolCall, ToolContent, ToolResult};
pub use stream::{StopReason, StreamChunk};
