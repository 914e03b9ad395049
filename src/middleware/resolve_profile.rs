use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::auth::Capability;
use crate::database::models::Profile;
use crate::error::ApiError;

/// Profile row of the caller plus what it may do
#[derive(Clone, Debug)]
pub struct ResolvedUser {
    pub profile: Profile,
    pub capability: Capability,
}

/// Loads the caller's profile after JWT validation and resolves its capability.
/// Handlers decide whether `Unauthorized` is acceptable (e.g. `/api/me`).
pub async fn resolve_profile_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| {
            ApiError::unauthorized("JWT authentication required before profile lookup")
        })?;

    let profile = state.console.profile(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!("No profile for authenticated user {}", auth_user.user_id);
        ApiError::forbidden("Profile not found")
    })?;

    let capability = Capability::resolve(&profile);
    tracing::debug!("User {} resolved to {:?}", profile.id, capability);

    request.extensions_mut().insert(ResolvedUser { profile, capability });
    Ok(next.run(request).await)
}
