//! Pure parsing of the synthesis provider's response bodies.
//!
//! The provider is loose about key casing and nesting across
//! deployments, so task ids, statuses and result URLs are probed at
//! every location observed in the wild. Kept free of HTTP so the state
//! machine is unit-testable.

use crate::error::{FitroomError, Result};
use crate::retry::PollState;
use serde_json::Value;

/// Status strings treated as terminal success, compared upper-cased.
const SUCCESS_STATUSES: [&str; 3] = ["SUCCEEDED", "SUCCESS", "DONE"];

/// Status strings treated as terminal failure.
const FAILURE_STATUSES: [&str; 2] = ["FAILED", "FAIL"];

/// Probe a submit response for the task identifier:
/// `output.task_id | output.taskId | task_id | taskId`.
pub(crate) fn extract_task_id(body: &Value) -> Option<String> {
    let output = body.get("output").unwrap_or(&Value::Null);
    [
        output.get("task_id"),
        output.get("taskId"),
        body.get("task_id"),
        body.get("taskId"),
    ]
    .into_iter()
    .flatten()
    .find_map(value_as_string)
}

/// Interpret one raw poll response body.
///
/// Success statuses resolve to the result URL (or a `Remote` error when
/// the provider claims success without one), failure statuses are
/// terminal `Remote` errors, anything else is pending. A body that is
/// not JSON at all is a terminal `MalformedResponse`.
pub(crate) fn parse_poll_body(raw: &str) -> Result<PollState<String>> {
    let body: Value =
        serde_json::from_str(raw).map_err(|e| FitroomError::MalformedResponse {
            message: format!("task status response is not JSON: {e}"),
            raw: raw.to_string(),
        })?;

    let output = body.get("output").cloned().unwrap_or(Value::Null);
    let status = output
        .get("task_status")
        .or_else(|| output.get("taskStatus"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_uppercase();

    if SUCCESS_STATUSES.contains(&status.as_str()) {
        return match extract_result_url(&output) {
            Some(url) => Ok(PollState::Complete(url)),
            None => Err(FitroomError::remote(
                None,
                format!("job succeeded but returned no image URL: {raw}"),
            )),
        };
    }

    if FAILURE_STATUSES.contains(&status.as_str()) {
        return Err(FitroomError::remote(
            None,
            format!("synthesis job failed: {raw}"),
        ));
    }

    Ok(PollState::Pending {
        raw: Some(raw.to_string()),
    })
}

/// Find the result URL in a success payload.
///
/// `results` may be a list or a single object (normalized to a list);
/// its first entry is probed for `url | image_url | imageUrl`, and the
/// same keys are tried at the `output` top level as a last resort.
fn extract_result_url(output: &Value) -> Option<String> {
    let results = output
        .get("results")
        .or_else(|| output.get("result"))
        .cloned()
        .unwrap_or(Value::Null);

    let normalized = match results {
        Value::Array(items) => items,
        Value::Object(_) => vec![results],
        _ => Vec::new(),
    };

    if let Some(first) = normalized.first() {
        for key in ["url", "image_url", "imageUrl"] {
            if let Some(url) = first.get(key).and_then(value_as_string) {
                return Some(url);
            }
        }
    }

    for key in ["url", "image_url", "imageUrl"] {
        if let Some(url) = output.get(key).and_then(value_as_string) {
            return Some(url);
        }
    }

    None
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
