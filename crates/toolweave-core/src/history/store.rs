//! Per-user conversation history
//!
//! Two rules hold for every user's log:
//! - a message carrying tool invocations is followed by the message that
//!   carries their results
//! - the estimated token total stays under the ceiling, unless a single
//!   message alone exceeds it
//!
//! The first rule is repaired on append and enforced again on read; the
//! second is enforced by evicting from the oldest end after every append.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::Logger;
use crate::types::ChatMessage;
use crate::{log_debug, log_info};

use super::tokens::{estimate_tokens, estimate_total};

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<ChatMessage>,
    token_total: usize,
}

impl Conversation {
    /// Append, first re-inserting the invocation an orphaned result belongs to
    fn push_paired(&mut self, message: ChatMessage) -> bool {
        let mut healed = false;
        if message.has_tool_result() {
            let paired = self
                .messages
                .last()
                .map(|last| last.has_tool_use() && message.answers(last))
                .unwrap_or(false);

            if !paired {
                let invocations = self.messages.iter().rev().filter(|m| m.has_tool_use());
                let clone = invocations
                    .clone()
                    .find(|m| message.answers(m))
                    .or_else(|| invocations.clone().next())
                    .cloned();
                if let Some(invocation) = clone {
                    self.token_total += estimate_tokens(&invocation);
                    self.messages.push(invocation);
                    healed = true;
                }
            }
        }
        self.token_total += estimate_tokens(&message);
        self.messages.push(message);
        healed
    }

    /// Messages with every unanswered invocation and every result without
    /// its invocation removed
    fn paired_messages(&self) -> Vec<&ChatMessage> {
        let mut out: Vec<&ChatMessage> = Vec::with_capacity(self.messages.len());
        for (i, msg) in self.messages.iter().enumerate() {
            if msg.has_tool_use() {
                let answered = self
                    .messages
                    .get(i + 1)
                    .map(|next| next.answers(msg))
                    .unwrap_or(false);
                if !answered {
                    continue;
                }
            }
            if msg.has_tool_result() {
                let after_invocation = out
                    .last()
                    .map(|prev| prev.has_tool_use() && msg.answers(prev))
                    .unwrap_or(false);
                if !after_invocation {
                    continue;
                }
            }
            out.push(msg);
        }
        out
    }
}

/// Take the newest `limit` messages without separating an invocation from its results
fn window<'a>(messages: &[&'a ChatMessage], limit: usize) -> Vec<&'a ChatMessage> {
    let mut taken: Vec<&ChatMessage> = Vec::with_capacity(limit);
    let mut i = messages.len();

    while i > 0 && taken.len() < limit {
        let current = messages[i - 1];

        if current.has_tool_result() && i > 1 && messages[i - 2].has_tool_use() {
            // The pair goes in whole or not at all
            if taken.len() + 2 > limit {
                break;
            }
            taken.push(current);
            taken.push(messages[i - 2]);
            i -= 2;
            continue;
        }

        taken.push(current);
        i -= 1;
    }

    taken.reverse();
    taken
}

/// Conversation history keyed by user id
pub struct HistoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    token_ceiling: usize,
    logger: Arc<dyn Logger>,
}

impl HistoryStore {
    /// Create a store whose per-user history is capped at `token_ceiling` estimated tokens
    pub fn new(token_ceiling: usize, logger: Arc<dyn Logger>) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            token_ceiling,
            logger,
        }
    }

    pub fn token_ceiling(&self) -> usize {
        self.token_ceiling
    }

    /// Append a message, then enforce the token budget
    pub fn append(&self, user_id: &str, message: ChatMessage) {
        self.append_many(user_id, vec![message]);
    }

    /// Append messages in order, then enforce the token budget
    pub fn append_many(&self, user_id: &str, messages: Vec<ChatMessage>) {
        {
            let mut conversations = self.conversations.write();
            let conversation = conversations.entry(user_id.to_string()).or_default();
            for message in messages {
                if conversation.push_paired(message) {
                    log_info!(
                        self.logger,
                        "[HistoryStore] Re-inserted tool invocation ahead of an unpaired result for {}",
                        user_id
                    );
                }
            }
        }
        self.enforce_budget(user_id);
    }

    /// History ready to send to a model
    ///
    /// Invocations without their results are dropped. With `limit`, only the
    /// newest `limit` messages are returned and an invocation/result pair
    /// that does not fit is left out entirely.
    pub fn read(&self, user_id: &str, limit: Option<usize>) -> Vec<ChatMessage> {
        let conversations = self.conversations.read();
        let Some(conversation) = conversations.get(user_id) else {
            return Vec::new();
        };

        let paired = conversation.paired_messages();
        let selected = match limit {
            Some(limit) if limit > 0 => window(&paired, limit),
            _ => paired,
        };
        selected.into_iter().cloned().collect()
    }

    /// Forget a user's history and token accounting
    pub fn reset(&self, user_id: &str) {
        if self.conversations.write().remove(user_id).is_some() {
            log_info!(self.logger, "[HistoryStore] Reset history for {}", user_id);
        }
    }

    /// Evict the oldest messages until the user's history fits the ceiling
    ///
    /// The first message is kept while others remain. An invocation is
    /// evicted together with the result that follows it.
    pub fn enforce_budget(&self, user_id: &str) {
        let mut conversations = self.conversations.write();
        let Some(conversation) = conversations.get_mut(user_id) else {
            return;
        };

        let mut evicted = 0;
        while conversation.token_total > self.token_ceiling && conversation.messages.len() > 1 {
            let pair = conversation.messages[1].has_tool_use()
                && conversation
                    .messages
                    .get(2)
                    .map(|next| next.answers(&conversation.messages[1]))
                    .unwrap_or(false);

            let removed = if pair { 2 } else { 1 };
            conversation.messages.drain(1..1 + removed);
            conversation.token_total = estimate_total(&conversation.messages);
            evicted += removed;
        }

        if evicted > 0 {
            log_debug!(
                self.logger,
                "[HistoryStore] Evicted {} messages for {}, {} tokens remain (ceiling {})",
                evicted,
                user_id,
                conversation.token_total,
                self.token_ceiling
            );
        }
    }

    /// Estimated tokens currently stored for a user
    pub fn token_total(&self, user_id: &str) -> usize {
        self.conversations
            .read()
            .get(user_id)
            .map(|c| c.token_total)
            .unwrap_or(0)
    }

    /// Number of stored messages for a user, including unpaired ones
    pub fn len(&self, user_id: &str) -> usize {
        self.conversations
            .read()
            .get(user_id)
            .map(|c| c.messages.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, user_id: &str) -> bool {
        self.len(user_id) == 0
    }
}
