//! Concurrent device quota configuration.

use serde::{Deserialize, Serialize};

/// Concurrent device quota configuration.
///
/// The quota itself (`max_login_devices` row in `system_configs`) is a
/// runtime setting; this section only carries the deployment toggle.
/// Disabled by default, matching non-production deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Whether the device quota is enforced at login.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}
