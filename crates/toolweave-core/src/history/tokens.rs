//! Token cost heuristic
//!
//! Roughly four characters per token plus a fixed overhead per message.
//! This is a budget signal, not a tokenizer: treat the ceiling it is
//! compared against as a tunable safety margin.

use crate::types::{ChatMessage, ContentPart, MessageContent, ToolContent};

/// Fixed cost charged for every message (role and framing)
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Characters assumed per token
pub const CHARS_PER_TOKEN: usize = 4;

fn chars_to_tokens(chars: usize) -> usize {
    chars.div_ceil(CHARS_PER_TOKEN)
}

fn tool_content_chars(content: &ToolContent) -> usize {
    match content {
        ToolContent::Text { text } => text.chars().count(),
        // Serialized size stands in for the decoded image
        ToolContent::Image { media_type, data } => media_type.len() + data.len(),
        ToolContent::Json { value } => value.to_string().len(),
    }
}

fn part_chars(part: &ContentPart) -> usize {
    match part {
        ContentPart::Text { text } => text.chars().count(),
        ContentPart::ToolUse { id, name, input } => id.len() + name.len() + input.to_string().len(),
        ContentPart::ToolResult {
            tool_use_id, content, ..
        } => tool_use_id.len() + content.iter().map(tool_content_chars).sum::<usize>(),
    }
}

/// Estimated token cost of one message
pub fn estimate_tokens(message: &ChatMessage) -> usize {
    let chars = match &message.content {
        MessageContent::Text(text) => text.chars().count(),
        MessageContent::Parts(parts) => parts.iter().map(part_chars).sum(),
    };
    MESSAGE_OVERHEAD_TOKENS + chars_to_tokens(chars)
}

/// Estimated token cost of a sequence of messages
pub fn estimate_total(messages: &[ChatMessage]) -> usize {
    messages.iter().map(estimate_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;
    use serde_json::json;

    #[test]
    fn test_text_estimate() {
        assert_eq!(estimate_tokens(&ChatMessage::user("")), MESSAGE_OVERHEAD_TOKENS);
        assert_eq!(estimate_tokens(&ChatMessage::user("abcd")), MESSAGE_OVERHEAD_TOKENS + 1);
        assert_eq!(estimate_tokens(&ChatMessage::user("abcde")), MESSAGE_OVERHEAD_TOKENS + 2);
    }

    #[test]
    fn test_structured_estimate_counts_every_block() {
        let invocation = ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![ContentPart::tool_use("t1", "search", json!({"query": "weather in Warsaw"}))],
        );
        let small = ChatMessage::with_parts(
            MessageRole::User,
            vec![ContentPart::tool_result("t1", vec![ToolContent::text("ok")], false)],
        );
        let image = ChatMessage::with_parts(
            MessageRole::User,
            vec![ContentPart::tool_result(
                "t1",
                vec![ToolContent::Image {
                    media_type: "image/png".to_string(),
                    data: "A".repeat(4000),
                }],
                false,
            )],
        );

        assert!(estimate_tokens(&invocation) > MESSAGE_OVERHEAD_TOKENS + 5);
        assert!(estimate_tokens(&image) > estimate_tokens(&small) + 900);
        assert_eq!(
            estimate_total(&[invocation.clone(), small.clone()]),
            estimate_tokens(&invocation) + estimate_tokens(&small)
        );
    }
}
