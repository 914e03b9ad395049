use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};
use crate::services::{self, DepartmentExport};

/// GET /api/departments/:id/export - group board with spouses paired
pub async fn department_export(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<DepartmentExport> {
    let scope = user.capability.require_console()?;
    let export = services::department_export(state.console.as_ref(), scope, department_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Department not found"))?;
    Ok(ApiResponse::success(export))
}
