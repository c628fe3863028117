//! Conversation history
//!
//! In-memory, per-user message logs with tool pairing repair and a token
//! budget. Nothing is persisted.

mod store;
mod tokens;

pub use store::HistoryStore;
pub use tokens::{estimate_tokens, estimate_total, CHARS_PER_TOKEN, MESSAGE_OVERHEAD_TOKENS};
