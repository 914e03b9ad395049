use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::store::Counter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ResolvedUser};
use crate::realtime::spawn_unread_watcher;

/// GET /api/inquiries/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
) -> ApiResult<Value> {
    let scope = user.capability.require_console()?;
    let count = state.console.count(Counter::UnreadInquiries, scope).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// POST /api/inquiries/:id/read - clear the admin-unread flag
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let scope = user.capability.require_console()?;
    if !state.console.mark_inquiry_read(id, scope).await? {
        return Err(ApiError::not_found("Inquiry not found"));
    }
    tracing::info!("Inquiry {} marked read by {}", id, user.profile.id);
    Ok(ApiResponse::success(json!({ "id": id, "is_admin_unread": false })))
}

/// GET /api/inquiries/unread-count/stream - Server-Sent Events
///
/// Emits an `unread_count` event with `{ "count": n }` on connect and after
/// every inquiry change. The watcher task ends when the client disconnects.
pub async fn unread_count_stream(
    State(state): State<AppState>,
    Extension(user): Extension<ResolvedUser>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let scope = user.capability.require_console()?;
    let changes = state.console.subscribe_inquiry_changes().await?;
    let feed = spawn_unread_watcher(state.console.clone(), scope, changes);
    tracing::debug!("Unread stream opened for {}", user.profile.id);

    let events = stream::unfold(feed.counts, |mut counts| async move {
        let count = counts.recv().await?;
        let event = Event::default()
            .event("unread_count")
            .json_data(json!({ "count": count }));
        Some((event, counts))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
