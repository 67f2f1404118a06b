//! Turns the model's raw answer into an [`ExtractedFields`] record.
//!
//! Fence stripping is the only repair attempted. Anything that is not a JSON
//! object after that is rejected outright.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::AppError;
use crate::models::offer::ExtractedFields;

lazy_static! {
    static ref FENCE_MARKER: Regex = Regex::new(r"```(?:json)?\n?").unwrap();
}

/// Strips every ```` ```json ```` and ```` ``` ```` marker once the text contains a fence.
pub fn strip_json_fences(text: &str) -> String {
    let text = text.trim();
    if text.contains("```") {
        FENCE_MARKER.replace_all(text, "").trim().to_string()
    } else {
        text.to_string()
    }
}

/// Parses model output into a complete record.
///
/// Known fields are normalized by kind; absent ones become empty strings and
/// unknown keys are ignored. Fails with `AppError::Parse` when the text is not
/// a JSON object.
pub fn parse_extraction(raw: &str) -> Result<ExtractedFields, AppError> {
    let json = strip_json_fences(raw);

    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| AppError::Parse(format!("model output is not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(AppError::Parse(
            "model output is not a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Parse(format!("model output does not match the schema: {e}")))
}
