use axum::Extension;
use serde::Serialize;

use crate::auth::Capability;
use crate::database::models::Profile;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub profile: Profile,
    pub capability: Capability,
}

/// GET /api/me - profile of the caller and its resolved capability
///
/// Unauthorized profiles (e.g. pending admins) still get a 200 here so the
/// console can show the "awaiting approval" screen.
pub async fn me(Extension(user): Extension<ResolvedUser>) -> ApiResult<MeResponse> {
    Ok(ApiResponse::success(MeResponse {
        profile: user.profile,
        capability: user.capability,
    }))
}
