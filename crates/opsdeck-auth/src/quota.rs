//! Concurrent device quota enforcement.
//!
//! Runs at login, after credential verification and before token issuance.
//! A quota rejection is not a failed password attempt: the login attempt
//! guard is never touched on this path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use opsdeck_database::repositories::SettingsRepository;

use crate::error::AuthError;
use crate::presence::PresenceService;

/// Enforces the `max_login_devices` quota at login time.
#[derive(Debug, Clone)]
pub struct DeviceQuotaEnforcer {
    /// Deployment toggle; when false the quota is never consulted.
    enabled: bool,
    /// Runtime settings (quota count).
    settings: Arc<SettingsRepository>,
    /// Online session counting.
    presence: Arc<PresenceService>,
}

impl DeviceQuotaEnforcer {
    /// Creates a new quota enforcer.
    pub fn new(
        enabled: bool,
        settings: Arc<SettingsRepository>,
        presence: Arc<PresenceService>,
    ) -> Self {
        Self {
            enabled,
            settings,
            presence,
        }
    }

    /// Whether the quota is active for this deployment.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Rejects the login when the user already has `max_login_devices`
    /// sessions online. A missing or non-positive setting means unbounded.
    pub async fn check(&self, user_id: i64, now: DateTime<Utc>) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }

        let Some(max_devices) = self.settings.max_login_devices().await else {
            return Ok(());
        };

        let online = self.presence.online_count(user_id, now).await?;
        debug!(user_id, online, max_devices, "Device quota check");

        if exceeds_quota(online, max_devices) {
            return Err(AuthError::DeviceQuotaExceeded);
        }

        Ok(())
    }
}

/// The quota decision: `online` sessions already at or over the cap.
fn exceeds_quota(online: usize, max_devices: u32) -> bool {
    online >= max_devices as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_boundary() {
        assert!(!exceeds_quota(0, 2));
        assert!(!exceeds_quota(1, 2));
        assert!(exceeds_quota(2, 2));
        assert!(exceeds_quota(3, 2));
    }
}
