//! Admin-facing session queries.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use opsdeck_auth::presence::{PresenceService, SessionView};
use opsdeck_core::error::AppError;
use opsdeck_core::result::AppResult;
use opsdeck_database::repositories::UserRepository;

use crate::context::RequestContext;

/// Lists a user's recent sessions for the administration screens.
#[derive(Debug, Clone)]
pub struct SessionQueryService {
    /// Presence resolution over the event log.
    presence: Arc<PresenceService>,
    /// Target account resolution.
    users: Arc<UserRepository>,
}

impl SessionQueryService {
    /// Creates a new session query service.
    pub fn new(presence: Arc<PresenceService>, users: Arc<UserRepository>) -> Self {
        Self { presence, users }
    }

    /// Lists the target user's sessions within the lookback window,
    /// enriched with IP locations. Admin only.
    pub async fn list_sessions(
        &self,
        ctx: &RequestContext,
        target_user_id: i64,
    ) -> AppResult<Vec<SessionView>> {
        if !ctx.is_admin() {
            return Err(AppError::authorization(
                "Only administrators may list user sessions",
            ));
        }

        self.users
            .find_by_id(target_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let views = self
            .presence
            .list_sessions(target_user_id, Utc::now())
            .await?;

        info!(
            admin_id = ctx.user_id,
            target_user_id,
            sessions = views.len(),
            "Listed user sessions"
        );

        Ok(views)
    }
}
