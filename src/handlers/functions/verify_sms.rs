use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::json_body;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySmsRequest {
    pub phone: String,
    pub code: String,
    pub full_name: Option<String>,
}

/// POST /functions/verify-sms - redeem a code and look up the matching member
///
/// Expected Output:
/// ```json
/// { "success": true, "matched_member": { "id": "...", "full_name": "홍길동" } }
/// ```
/// `matched_member` is null when no directory entry carries the phone (or name).
pub async fn verify_sms(
    State(state): State<AppState>,
    payload: Result<Json<VerifySmsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload, "phone and code are required")?;
    if request.phone.trim().is_empty() || request.code.trim().is_empty() {
        return Err(ApiError::bad_request("phone and code are required"));
    }

    let matched = state
        .verification_service()
        .verify(&request.phone, &request.code, request.full_name.as_deref())
        .await?;

    Ok(Json(json!({ "success": true, "matched_member": matched })))
}
