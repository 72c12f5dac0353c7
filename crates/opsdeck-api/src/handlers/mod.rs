//! HTTP and WebSocket request handlers.

pub mod auth;
pub mod health;
pub mod notifications;
pub mod sessions;
pub mod ws;

use axum::http::HeaderMap;

use opsdeck_auth::session::ClientInfo;

/// Builds the client origin info recorded on appended events.
pub(crate) fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    ClientInfo {
        ip_address,
        user_agent,
    }
}
