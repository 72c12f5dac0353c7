//! Route definitions for the Opsdeck HTTP API.
//!
//! All REST routes are mounted under `/api`; the WebSocket endpoint lives
//! at `/ws/notifications`. The router receives `AppState` and passes it to
//! all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(session_routes())
        .merge(notification_routes())
        .route("/health", get(handlers::health::health));

    let ws_routes = Router::new().route("/ws/notifications", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Auth endpoints: login, logout, heartbeat, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/heartbeat", post(handlers::auth::heartbeat))
        .route("/auth/me", get(handlers::auth::me))
}

/// Session administration endpoints
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/sessions",
            get(handlers::sessions::list_sessions),
        )
        .route(
            "/users/{id}/force-logout",
            post(handlers::sessions::force_logout),
        )
        .route(
            "/users/{id}/force-logout-session",
            post(handlers::sessions::force_logout_session),
        )
}

/// Notification read and push endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/{id}/push",
            post(handlers::notifications::push_to_user),
        )
        .route(
            "/notifications/broadcast-refresh",
            post(handlers::notifications::broadcast_refresh),
        )
}
