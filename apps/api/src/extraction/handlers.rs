//! Axum route handlers for the Extraction API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::extraction::extractor::extract_offer_fields;
use crate::extraction::request::build_extraction_request;
use crate::models::offer::ExtractedFields;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Kept untyped so a non-string value is a validation error, not a body rejection.
    #[serde(rename = "emailContent")]
    pub email_content: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub data: ExtractedFields,
}

/// POST /api/extract
///
/// Reads the pasted offer email and returns the fields the model found,
/// normalized and ready for review.
pub async fn handle_extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    let Json(request) = payload?;

    let extraction = build_extraction_request(request.email_content.as_ref())?;

    let llm = state.llm.as_ref().ok_or_else(|| {
        AppError::Configuration("DEEPSEEK_API_KEY is not set".to_string())
    })?;

    let data = extract_offer_fields(&extraction, llm.as_ref()).await?;

    Ok(Json(ExtractResponse {
        success: true,
        data,
    }))
}
