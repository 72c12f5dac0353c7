//! Revocation engine — account-level and per-session forced logout.
//!
//! Revocation is itself just another append to the event log; the presence
//! resolver and request validator pick it up on their next query without
//! any shared mutable session state.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use opsdeck_core::result::AppResult;
use opsdeck_database::repositories::AuthEventRepository;
use opsdeck_entity::auth_event::{AuthAction, CreateAuthEvent, session_tag};

use crate::error::AuthError;
use crate::presence::PresenceService;

/// Description recorded on the automatic account-level event appended when
/// a session revocation leaves no other session online.
const NO_ACTIVE_SESSIONS: &str = "no_active_sessions";

/// Identifies the administrator performing a revocation.
#[derive(Debug, Clone)]
pub struct RevocationActor {
    /// Acting user's ID.
    pub user_id: i64,
    /// Acting user's username (recorded in event descriptions).
    pub username: String,
    /// The actor's own session, used by the self-revocation guard.
    pub session_id: Option<Uuid>,
    /// Request origin IP.
    pub ip_address: String,
    /// Request User-Agent.
    pub user_agent: String,
}

/// Appends revocation events and the bookkeeping that follows them.
#[derive(Debug, Clone)]
pub struct RevocationEngine {
    /// Event log store.
    events: Arc<AuthEventRepository>,
    /// Presence recomputation after session revocations.
    presence: Arc<PresenceService>,
}

impl RevocationEngine {
    /// Creates a new revocation engine.
    pub fn new(events: Arc<AuthEventRepository>, presence: Arc<PresenceService>) -> Self {
        Self { events, presence }
    }

    /// Revokes every session of an account.
    ///
    /// All credentials whose sessions were last active at or before this
    /// event become invalid; activity after it is unaffected.
    pub async fn force_logout_account(
        &self,
        actor: &RevocationActor,
        target_user_id: i64,
    ) -> AppResult<()> {
        self.events
            .append(&CreateAuthEvent {
                user_id: Some(target_user_id),
                action: AuthAction::ForceLogout,
                module: "user".to_string(),
                description: format!("forced offline by admin {}", actor.username),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
                ip_location: None,
            })
            .await?;

        info!(
            admin_id = actor.user_id,
            target_user_id, "Account force-logout recorded"
        );

        Ok(())
    }

    /// Revokes a single session of an account.
    ///
    /// Rejects revoking the caller's own current session. After appending
    /// the session-level event, recomputes presence for the remaining
    /// sessions; when none is still online, an automatic account-level
    /// event is appended so stale per-account checks also see the user as
    /// fully logged out. Returns whether any other session remains online.
    pub async fn force_logout_session(
        &self,
        actor: &RevocationActor,
        target_user_id: i64,
        session_id: Uuid,
    ) -> Result<bool, AuthError> {
        if actor.user_id == target_user_id && actor.session_id == Some(session_id) {
            return Err(AuthError::SelfRevocationRejected);
        }

        self.events
            .append(&CreateAuthEvent {
                user_id: Some(target_user_id),
                action: AuthAction::ForceLogoutSession,
                module: "user".to_string(),
                description: session_tag(session_id),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
                ip_location: None,
            })
            .await?;

        let any_online = self
            .presence
            .online_count_excluding(target_user_id, session_id, Utc::now())
            .await?
            > 0;

        if !any_online {
            self.events
                .append(&CreateAuthEvent {
                    user_id: Some(target_user_id),
                    action: AuthAction::ForceLogout,
                    module: "user".to_string(),
                    description: NO_ACTIVE_SESSIONS.to_string(),
                    ip_address: actor.ip_address.clone(),
                    user_agent: actor.user_agent.clone(),
                    ip_location: None,
                })
                .await?;
        }

        info!(
            admin_id = actor.user_id,
            target_user_id,
            session_id = %session_id,
            any_online,
            "Session force-logout recorded"
        );

        Ok(any_online)
    }
}
