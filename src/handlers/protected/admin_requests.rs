use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AdminDecision;
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: AdminDecision,
}

/// GET /api/admin-requests - pending admin sign-ups (master only)
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
) -> ApiResult<Vec<Profile>> {
    user.capability.require_master()?;
    let scope = user.capability.require_console()?;
    Ok(ApiResponse::success(state.console.pending_admins(scope).await?))
}

/// POST /api/admin-requests/:id - approve or reject a pending admin
///
/// Expected Input:
/// ```json
/// { "decision": "approve" }
/// ```
/// Returns 409 when the profile is not pending.
pub async fn decide(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    user.capability.require_master()?;
    let request = json_body(payload, "decision must be \"approve\" or \"reject\"")?;

    let mut profile = state
        .console
        .profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let current = profile.admin_status();
    let next = current.decide(request.decision)?;
    if !state.console.set_admin_status(id, current, next).await? {
        // Another decision landed between the read and the write
        return match state.console.profile(id).await? {
            Some(latest) => Err(ApiError::conflict(format!(
                "Admin request is {}, not pending",
                latest.admin_status().as_str()
            ))),
            None => Err(ApiError::not_found("Profile not found")),
        };
    }
    tracing::info!("Admin request {} set to {} by {}", id, next.as_str(), user.profile.id);

    profile.admin_status = next.as_str().to_string();
    Ok(ApiResponse::success(profile))
}
