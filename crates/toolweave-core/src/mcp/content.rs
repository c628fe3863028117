//! Tool output normalization
//!
//! Converts MCP call results into `ToolOutput`, filling in image media types
//! that servers leave out.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rmcp::model::{CallToolResult, RawContent, ResourceContents};

use crate::tools::ToolOutput;
use crate::types::ToolContent;

use super::client::{McpError, McpResult};

/// Media type assumed when the bytes match no known signature
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// Identify an image format from its leading bytes
pub fn detect_image_bytes(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x42, 0x4D, ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Drop a `data:image/...;base64,` prefix if present
pub fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:image/") {
        if let Some((_, payload)) = data.split_once(";base64,") {
            return payload;
        }
    }
    data
}

/// Media type of base64 image data, `image/jpeg` when unrecognized
pub fn detect_image_format(base64_data: &str) -> &'static str {
    let clean = strip_data_url(base64_data);
    // 32 base64 characters decode to the 24 bytes the signatures need
    let prefix_len = clean.len().min(32) / 4 * 4;
    clean
        .get(..prefix_len)
        .and_then(|prefix| STANDARD.decode(prefix).ok())
        .and_then(|bytes| detect_image_bytes(&bytes))
        .unwrap_or(DEFAULT_IMAGE_MEDIA_TYPE)
}

fn image_content(data: &str, mime_type: &str) -> ToolContent {
    let media_type = if mime_type.trim().is_empty() {
        detect_image_format(data).to_string()
    } else {
        mime_type.to_string()
    };
    ToolContent::Image {
        media_type,
        data: strip_data_url(data).to_string(),
    }
}

/// Convert an MCP call result into tool output
///
/// A result the server flags as an error becomes `ToolReportedError`
/// carrying the result text.
pub fn normalize_call_result(tool: &str, result: CallToolResult) -> McpResult<ToolOutput> {
    let mut content: Vec<ToolContent> = result
        .content
        .iter()
        .map(|item| match &item.raw {
            RawContent::Text(text) => ToolContent::text(text.text.clone()),
            RawContent::Image(image) => image_content(&image.data, &image.mime_type),
            RawContent::Resource(embedded) => match &embedded.resource {
                ResourceContents::TextResourceContents { uri, text, .. } => {
                    ToolContent::text(format!("[Resource: {}]\n{}", uri, text))
                }
                ResourceContents::BlobResourceContents { uri, .. } => {
                    ToolContent::text(format!("[Resource: {}]", uri))
                }
            },
            RawContent::Audio(audio) => ToolContent::text(format!("[Audio: {}]", audio.mime_type)),
            RawContent::ResourceLink(link) => ToolContent::text(format!("[ResourceLink: {}]", link.uri)),
        })
        .collect();

    if let Some(structured) = result.structured_content {
        content.push(ToolContent::Json { value: structured });
    }

    if result.is_error.unwrap_or(false) {
        let message = content
            .iter()
            .map(ToolContent::render)
            .collect::<Vec<_>>()
            .join("\n");
        return Err(McpError::ToolReportedError {
            tool: tool.to_string(),
            message,
        });
    }

    Ok(ToolOutput::new(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_detect_image_bytes() {
        assert_eq!(detect_image_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]), Some("image/png"));
        assert_eq!(detect_image_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_image_bytes(b"GIF89a"), Some("image/gif"));
        assert_eq!(detect_image_bytes(b"RIFF\x24\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_image_bytes(b"BM\x36\x00"), Some("image/bmp"));
        assert_eq!(detect_image_bytes(b"RIFF\x24\x00\x00\x00WAVE"), None);
        assert_eq!(detect_image_bytes(&[]), None);
    }

    #[test]
    fn test_detect_image_format_from_base64() {
        assert_eq!(detect_image_format(PNG_1X1), "image/png");
        assert_eq!(
            detect_image_format(&format!("data:image/png;base64,{}", PNG_1X1)),
            "image/png"
        );
        assert_eq!(detect_image_format(&STANDARD.encode(b"GIF89a-and-more-bytes")), "image/gif");
        // Undecodable or unknown data falls back to JPEG
        assert_eq!(detect_image_format("!!not base64!!"), "image/jpeg");
        assert_eq!(detect_image_format(&STANDARD.encode(b"plain text here")), "image/jpeg");
    }

    #[test]
    fn test_normalize_fills_missing_media_type() {
        let result = CallToolResult::success(vec![
            Content::text("screenshot taken"),
            Content::image(format!("data:image/png;base64,{}", PNG_1X1), ""),
        ]);

        let output = normalize_call_result("screenshot", result).unwrap();
        assert_eq!(output.content[0], ToolContent::text("screenshot taken"));
        assert_eq!(
            output.content[1],
            ToolContent::Image {
                media_type: "image/png".to_string(),
                data: PNG_1X1.to_string(),
            }
        );
    }

    #[test]
    fn test_normalize_keeps_declared_media_type() {
        let result = CallToolResult::success(vec![Content::image(PNG_1X1, "image/x-custom")]);
        let output = normalize_call_result("render", result).unwrap();
        assert!(matches!(
            &output.content[0],
            ToolContent::Image { media_type, .. } if media_type == "image/x-custom"
        ));
    }

    #[test]
    fn test_structured_content_becomes_json() {
        let result = CallToolResult::structured(json!({"temperature": 21}));
        let output = normalize_call_result("weather", result).unwrap();
        assert!(output
            .content
            .iter()
            .any(|c| *c == ToolContent::Json { value: json!({"temperature": 21}) }));
    }

    #[test]
    fn test_reported_error_is_invocation_error() {
        let result = CallToolResult::error(vec![Content::text("no such file")]);
        let err = normalize_call_result("read_file", result).unwrap_err();
        match err {
            McpError::ToolReportedError { tool, message } => {
                assert_eq!(tool, "read_file");
                assert_eq!(message, "no such file");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
