//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use opsdeck_auth::jwt::TokenDecoder;
use opsdeck_auth::lockout::LoginAttemptGuard;
use opsdeck_auth::revocation::RevocationEngine;
use opsdeck_auth::session::{RequestAuthenticator, SessionManager};
use opsdeck_core::config::AppConfig;
use opsdeck_realtime::hub::PushHub;
use opsdeck_service::notification::NotificationReadService;
use opsdeck_service::session::SessionQueryService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks. The mutable registries
/// (attempt counters, socket pool) live inside their owning structs and
/// are constructed once at startup; nothing here is ambient.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Per-request token validation against the live event log.
    pub authenticator: Arc<RequestAuthenticator>,
    /// Signature-only token decoding (WebSocket handshake).
    pub token_decoder: Arc<TokenDecoder>,
    /// Login/heartbeat/logout flows.
    pub session_manager: Arc<SessionManager>,
    /// Failed-attempt tracking (owned here so the sweeper can be spawned).
    pub attempt_guard: Arc<LoginAttemptGuard>,
    /// Account- and session-level forced logout.
    pub revocation: Arc<RevocationEngine>,
    /// Admin session listing.
    pub session_query: Arc<SessionQueryService>,
    /// Department-filtered notification read path.
    pub notifications: Arc<NotificationReadService>,
    /// Realtime push hub.
    pub push_hub: Arc<PushHub>,
}
