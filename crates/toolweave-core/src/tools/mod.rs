//! Tool management module
//!
//! This module provides tool registration, routing and execution for LLM
//! tool calling. It coordinates tools from every connected provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │                                             │
//! │  - Registers tools per connection           │
//! │  - Routes a tool name to its owner          │
//! │  - Provides tools to LLM                    │
//! │  - Turns failures into error results        │
//! └─────────────────────────────────────────────┘
//!           │
//!           │ ToolProvider (discover, invoke)
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  McpClient (one per tool server)            │
//! │    stdio child process, HTTP, Unix socket   │
//! └─────────────────────────────────────────────┘
//! ```

mod error;
mod provider;
mod registry;

pub use error::ToolError;
pub use provider::{normalize_schema, ToolDescriptor, ToolOutput, ToolProvider};
pub use registry::{BootstrapReport, ToolRegistry};

#[cfg(test)]
pub(crate) use registry::tests::StaticToolProvider;
