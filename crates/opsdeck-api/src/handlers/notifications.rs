//! Notification read and push handlers.

use axum::Json;
use axum::extract::{Path, State};

use opsdeck_core::error::AppError;
use opsdeck_realtime::message::OutboundMessage;

use crate::dto::request::PushMessageRequest;
use crate::dto::response::{ApiResponse, MessageResponse, UnreadCountResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications/unread-count
///
/// Department-filtered REST count; the hub broadcast count is not
/// filtered. See DESIGN.md for the asymmetry.
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<ApiResponse<UnreadCountResponse>> {
    let count = state.notifications.unread_count(&auth).await;
    Json(ApiResponse::ok(UnreadCountResponse { count }))
}

/// POST /api/notifications/{id}/push
///
/// Delivers one notification to one user's sockets. Best effort: offline
/// users simply miss it.
pub async fn push_to_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
    Json(req): Json<PushMessageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError(AppError::authorization(
            "Administrator role required",
        )));
    }

    let notification = state
        .notifications
        .find(notification_id)
        .await?
        .ok_or_else(|| ApiError(AppError::not_found("Notification not found")))?;

    state
        .push_hub
        .send_message_to_user(req.user_id, &OutboundMessage::message_new(&notification));

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Message queued".to_string(),
    })))
}

/// POST /api/notifications/broadcast-refresh
///
/// Fans out a refresh signal plus a recomputed count to every connected
/// socket; called after notification content mutations.
pub async fn broadcast_refresh(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError(AppError::authorization(
            "Administrator role required",
        )));
    }

    state.push_hub.broadcast_refresh();
    state.push_hub.broadcast_count().await;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Broadcast sent".to_string(),
    })))
}
