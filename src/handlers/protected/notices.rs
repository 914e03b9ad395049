use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::Notice;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};

/// GET /api/notices - notices visible to the caller, pinned first then newest
pub async fn notices(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
) -> ApiResult<Vec<Notice>> {
    let scope = user.capability.require_console()?;
    Ok(ApiResponse::success(state.console.notices(scope).await?))
}
