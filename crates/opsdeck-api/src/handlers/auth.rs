//! Auth handlers — login, logout, heartbeat, me.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use validator::Validate;

use opsdeck_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{
    ApiResponse, HeartbeatResponse, LoginResponse, MessageResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::client_info;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let client = client_info(&headers);
    let outcome = state
        .session_manager
        .login(&req.username, &req.password, &client)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: UserResponse::from(&outcome.user),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let client = client_info(&headers);
    state
        .session_manager
        .logout(auth.user_id, auth.session_id, &client)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// POST /api/auth/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<HeartbeatResponse>>, ApiError> {
    let client = client_info(&headers);
    state
        .session_manager
        .heartbeat(auth.user_id, auth.session_id, &client)
        .await?;

    Ok(Json(ApiResponse::ok(HeartbeatResponse {
        ok: true,
        session_id: auth.session_id,
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(serde_json::json!({
        "id": auth.user_id,
        "username": auth.username,
        "role": auth.role,
        "session_id": auth.session_id,
        "department_id": auth.department_id,
    })))
}
