//! Session administration handlers — list, account and session force
//! logout.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use opsdeck_auth::revocation::RevocationActor;
use opsdeck_core::error::AppError;

use crate::dto::request::ForceLogoutSessionRequest;
use crate::dto::response::{
    ApiResponse, ForceLogoutSessionResponse, MessageResponse, SessionListResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::client_info;

/// Builds the revocation actor for the current admin request.
fn actor(auth: &AuthUser, headers: &HeaderMap) -> RevocationActor {
    let client = client_info(headers);
    RevocationActor {
        user_id: auth.user_id,
        username: auth.username.clone(),
        session_id: Some(auth.session_id),
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    }
}

/// Rejects non-admin callers.
fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError(AppError::authorization(
            "Administrator role required",
        )))
    }
}

/// GET /api/users/{id}/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<SessionListResponse>>, ApiError> {
    let list = state.session_query.list_sessions(&auth, user_id).await?;
    Ok(Json(ApiResponse::ok(SessionListResponse { list })))
}

/// POST /api/users/{id}/force-logout
pub async fn force_logout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_admin(&auth)?;

    state
        .revocation
        .force_logout_account(&actor(&auth, &headers), user_id)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "User forced offline".to_string(),
    })))
}

/// POST /api/users/{id}/force-logout-session
pub async fn force_logout_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<ForceLogoutSessionRequest>,
) -> Result<Json<ApiResponse<ForceLogoutSessionResponse>>, ApiError> {
    require_admin(&auth)?;

    let any_online = state
        .revocation
        .force_logout_session(&actor(&auth, &headers), user_id, req.session_id)
        .await?;

    Ok(Json(ApiResponse::ok(ForceLogoutSessionResponse {
        any_online,
    })))
}
