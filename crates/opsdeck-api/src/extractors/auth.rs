//! `AuthUser` extractor — pulls the token from the Authorization header,
//! runs the full validation pipeline, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use opsdeck_core::error::AppError;
use opsdeck_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract Bearer token from Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError(AppError::authentication("Missing Authorization header")))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError(AppError::authentication(
                "Invalid Authorization header format",
            ))
        })?;

        // Full validation: signature, account, revocations, inactivity.
        let authenticated = state.authenticator.validate(token).await?;

        let ip_address = client_ip(parts);
        let user_agent = header_string(parts, "user-agent");

        let ctx = RequestContext::new(
            authenticated.user.id,
            authenticated.claims.session_id(),
            authenticated.user.role,
            authenticated.user.username.clone(),
            authenticated.user.department_id,
            ip_address,
            user_agent,
        );

        Ok(AuthUser(ctx))
    }
}

/// Best-effort client IP: `X-Forwarded-For` first hop, else unknown.
pub fn client_ip(parts: &Parts) -> String {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Header value as an owned string, empty when absent.
pub fn header_string(parts: &Parts, name: &str) -> String {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
