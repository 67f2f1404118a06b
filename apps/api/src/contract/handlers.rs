//! Axum route handlers for the Contract API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;

use crate::contract::generator::{generate_contract, DOCX_CONTENT_TYPE};
use crate::errors::AppError;
use crate::models::offer::ContractRequest;
use crate::state::AppState;

/// POST /api/generate
///
/// Fills the contract template with the reviewed fields and returns the
/// document as an attachment.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<ContractRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;

    let today = chrono::Local::now().date_naive();
    let contract = generate_contract(&request, &state.config, today).await?;

    let headers = [
        (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, contract.content_disposition()),
    ];
    Ok((headers, Bytes::from(contract.bytes)))
}
