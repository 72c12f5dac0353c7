//! Application builder — wires repositories, the auth core, the push hub,
//! and the router together, then serves.

use std::sync::Arc;

use sqlx::PgPool;

use opsdeck_auth::jwt::{TokenDecoder, TokenIssuer};
use opsdeck_auth::lockout::LoginAttemptGuard;
use opsdeck_auth::password::PasswordHasher;
use opsdeck_auth::presence::{LocationResolver, NoopLocationLookup, PresenceService};
use opsdeck_auth::quota::DeviceQuotaEnforcer;
use opsdeck_auth::revocation::RevocationEngine;
use opsdeck_auth::session::{RequestAuthenticator, SessionManager};
use opsdeck_core::config::AppConfig;
use opsdeck_core::error::AppError;
use opsdeck_database::repositories::{
    AuthEventRepository, NotificationRepository, SettingsRepository, UserRepository,
};
use opsdeck_realtime::hub::PushHub;
use opsdeck_service::notification::NotificationReadService;
use opsdeck_service::session::SessionQueryService;

use crate::router::build_router;
use crate::state::AppState;

/// Assembles the full application state from configuration and a database
/// pool.
///
/// Everything mutable (attempt counters, socket registry, location memo)
/// is constructed here, once, and injected; there are no ambient globals.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> AppState {
    let config = Arc::new(config);

    // ── Repositories ─────────────────────────────────────────────
    let users = Arc::new(UserRepository::new(db_pool.clone()));
    let events = Arc::new(AuthEventRepository::new(db_pool.clone()));
    let notifications = Arc::new(NotificationRepository::new(db_pool.clone()));
    let settings = Arc::new(SettingsRepository::new(
        db_pool.clone(),
        config.session.inactive_ms_default,
    ));

    // ── Auth core ────────────────────────────────────────────────
    let issuer = Arc::new(TokenIssuer::new(&config.auth));
    let decoder = Arc::new(TokenDecoder::new(&config.auth));
    let hasher = Arc::new(PasswordHasher::new());
    let attempt_guard = Arc::new(LoginAttemptGuard::new());

    let location = Arc::new(LocationResolver::new(Arc::new(NoopLocationLookup)));
    let presence = Arc::new(PresenceService::new(
        Arc::clone(&events),
        Arc::clone(&settings),
        Arc::clone(&location),
        config.session.clone(),
    ));

    let quota = Arc::new(DeviceQuotaEnforcer::new(
        config.quota.enabled,
        Arc::clone(&settings),
        Arc::clone(&presence),
    ));

    let session_manager = Arc::new(SessionManager::new(
        Arc::clone(&users),
        Arc::clone(&events),
        Arc::clone(&attempt_guard),
        Arc::clone(&quota),
        Arc::clone(&issuer),
        Arc::clone(&hasher),
        Arc::clone(&location),
    ));

    let authenticator = Arc::new(RequestAuthenticator::new(
        Arc::clone(&decoder),
        Arc::clone(&users),
        Arc::clone(&events),
        Arc::clone(&settings),
    ));

    let revocation = Arc::new(RevocationEngine::new(
        Arc::clone(&events),
        Arc::clone(&presence),
    ));

    // ── Services & realtime ──────────────────────────────────────
    let session_query = Arc::new(SessionQueryService::new(
        Arc::clone(&presence),
        Arc::clone(&users),
    ));
    let notification_read = Arc::new(NotificationReadService::new(Arc::clone(&notifications)));
    let push_hub = Arc::new(PushHub::new(
        Arc::clone(&notifications),
        config.realtime.clone(),
    ));

    AppState {
        config,
        db_pool,
        authenticator,
        token_decoder: decoder,
        session_manager,
        attempt_guard,
        revocation,
        session_query,
        notifications: notification_read,
        push_hub,
    }
}

/// Runs the Opsdeck server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    let bind_addr = config.server.bind_addr();
    let state = build_state(config, db_pool);

    // Periodic lockout sweep: cache hygiene only, disabled under test
    // configuration.
    if state.config.session.lockout_sweep_enabled {
        Arc::clone(&state.attempt_guard)
            .spawn_sweeper(state.config.session.lockout_sweep_interval_seconds);
    }

    let app = build_router(state);

    tracing::info!(addr = %bind_addr, "Opsdeck listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {bind_addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}
