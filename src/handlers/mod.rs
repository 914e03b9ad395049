// Two tiers:
// functions  - public endpoints called by the member-facing app (/functions/*)
// protected  - console endpoints behind JWT + profile resolution (/api/*)
use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;

pub mod functions;
pub mod protected;

/// Malformed or mistyped bodies are a 400 with a fixed message, not axum's 422
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::bad_request(message)
    })
}
