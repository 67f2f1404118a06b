//! Builds the model request for a pasted offer email.

use serde_json::Value;

use crate::errors::AppError;
use crate::extraction::prompts::{EXTRACTION_SYSTEM, EXTRACTION_USER_PREFIX};

/// Emails shorter than this (after trimming) cannot be a complete offer.
pub const MIN_EMAIL_CHARS: usize = 50;

/// System and user instructions for one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub system: String,
    pub user: String,
}

/// Validates the raw `emailContent` value and builds the extraction request.
///
/// Rejects a missing or non-string value and text whose trimmed length is
/// under [`MIN_EMAIL_CHARS`] characters. The email itself is sent verbatim.
pub fn build_extraction_request(email_content: Option<&Value>) -> Result<ExtractionRequest, AppError> {
    let email = match email_content {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => {
            return Err(AppError::Validation(
                "emailContent must be a non-empty string".to_string(),
            ))
        }
    };

    if email.trim().chars().count() < MIN_EMAIL_CHARS {
        return Err(AppError::Validation(format!(
            "emailContent is too short ({MIN_EMAIL_CHARS} characters minimum), paste the complete offer email"
        )));
    }

    Ok(ExtractionRequest {
        system: EXTRACTION_SYSTEM.clone(),
        user: format!("{EXTRACTION_USER_PREFIX}{email}"),
    })
}
