use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};
use crate::services::{church_stats, ChurchStats};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub church_id: Option<Uuid>,
}

/// GET /api/stats?church_id= - dashboard counts
///
/// Masters may pick any church or none (global totals); church admins are
/// pinned to their own church and get 403 for any other.
pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<ChurchStats> {
    let scope = user.capability.require_console()?.narrowed_to(query.church_id)?;
    let stats = church_stats(state.console.as_ref(), scope).await?;
    Ok(ApiResponse::success(stats))
}
