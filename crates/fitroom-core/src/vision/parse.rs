//! Parsing of loosely-structured model output.
//!
//! The model is asked for strict JSON but routinely wraps its answer
//! in a Markdown code fence anyway; this module tolerates that.

use crate::error::{FitroomError, Result};
use serde::de::DeserializeOwned;

/// Remove a surrounding Markdown code fence, if present, and trim.
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` markers
/// anywhere in the text: the markers are stripped out rather than the
/// content sliced from between them.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.contains("```") {
        return trimmed.to_string();
    }
    trimmed.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse model output into `T`, stripping a code fence first.
pub fn parse_model_json<T: DeserializeOwned>(content: &str) -> Result<T> {
    let cleaned = strip_code_fence(content);
    serde_json::from_str(&cleaned).map_err(|e| FitroomError::MalformedResponse {
        message: format!("model did not return parseable JSON: {e}"),
        raw: content.to_string(),
    })
}
