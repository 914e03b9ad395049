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
pub struct SendSmsRequest {
    pub phone: String,
}

/// POST /functions/send-sms - issue a verification code for a phone number
///
/// Fails with `400 { "error": "account_exists", masked_email, full_name }`
/// when the phone already belongs to an account.
pub async fn send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendSmsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload, "phone is required")?;
    state.verification_service().issue_code(&request.phone).await?;
    Ok(Json(json!({ "success": true })))
}
