//! Conversation turns
//!
//! ```text
//! user input ──► HistoryStore ──► Provider ──► text ──► TurnSink
//!                    ▲                │
//!                    │           tool calls
//!                    │                ▼
//!                    └──── results ◄── ToolRegistry
//! ```

mod orchestrator;
mod sink;

pub use orchestrator::{
    Orchestrator, TurnInput, CONTEXT_OVERFLOW_MESSAGE, DEPTH_EXCEEDED_MESSAGE, GENERIC_ERROR_MESSAGE,
};
pub use sink::TurnSink;
