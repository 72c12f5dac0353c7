//! Presence queries against the live event log.
//!
//! Thin orchestration around [`resolve_sessions`]: fetch a snapshot, run
//! the pure resolver, enrich with locations. Revocation fetch failures
//! degrade to an empty set (the session then appears online rather than
//! failing the whole query); activity fetch failures propagate.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use opsdeck_core::config::SessionConfig;
use opsdeck_core::result::AppResult;
use opsdeck_database::repositories::{AuthEventRepository, SettingsRepository};

use super::location::LocationResolver;
use super::resolver::{SessionView, count_online, resolve_sessions};

/// Derives session lists and online counts for one user at a time.
#[derive(Debug, Clone)]
pub struct PresenceService {
    /// Event log store.
    events: Arc<AuthEventRepository>,
    /// Runtime settings (idle threshold).
    settings: Arc<SettingsRepository>,
    /// IP location resolution.
    location: Arc<LocationResolver>,
    /// Window and cap configuration.
    config: SessionConfig,
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(
        events: Arc<AuthEventRepository>,
        settings: Arc<SettingsRepository>,
        location: Arc<LocationResolver>,
        config: SessionConfig,
    ) -> Self {
        Self {
            events,
            settings,
            location,
            config,
        }
    }

    /// Resolves all session views for a user within the lookback window.
    pub async fn resolve(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<Vec<SessionView>> {
        let since = now - Duration::days(self.config.presence_window_days as i64);

        let activity = self
            .events
            .find_activity(user_id, since, self.config.activity_scan_limit)
            .await?;

        let revocations = match self
            .events
            .find_revocations(user_id, since, self.config.revocation_scan_limit)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                warn!(user_id, error = %e, "Revocation lookup failed, treating as none");
                Vec::new()
            }
        };

        let inactive_ms = self.settings.inactive_ms().await;
        Ok(resolve_sessions(&activity, &revocations, now, inactive_ms))
    }

    /// Resolves session views and enriches them with IP locations,
    /// backfilling resolved labels onto event rows that lack one.
    pub async fn list_sessions(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SessionView>> {
        let mut views = self.resolve(user_id, now).await?;

        for view in &mut views {
            if view.ip.is_empty() {
                view.location = super::location::UNKNOWN_LOCATION.to_string();
                continue;
            }
            let label = self.location.resolve(&view.ip).await;
            if let Err(e) = self
                .events
                .backfill_location(user_id, &view.ip, &label)
                .await
            {
                warn!(user_id, ip = %view.ip, error = %e, "Location backfill failed");
            }
            view.location = label;
        }

        Ok(views)
    }

    /// Counts the user's online sessions.
    pub async fn online_count(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<usize> {
        let views = self.resolve(user_id, now).await?;
        Ok(count_online(&views, None))
    }

    /// Counts the user's online sessions, skipping one session identifier.
    pub async fn online_count_excluding(
        &self,
        user_id: i64,
        exclude: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let views = self.resolve(user_id, now).await?;
        Ok(count_online(&views, Some(exclude)))
    }
}
