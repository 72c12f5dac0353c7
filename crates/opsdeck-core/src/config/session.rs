//! Session presence and login lockout configuration.

use serde::{Deserialize, Serialize};

/// Session presence and login lockout configuration.
///
/// The idle threshold itself is a runtime setting (`auto_logout` row in
/// `system_configs`); `inactive_ms_default` is the fallback used when that
/// row is missing or unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fallback idle threshold in milliseconds before a session counts as
    /// offline.
    #[serde(default = "default_inactive_ms")]
    pub inactive_ms_default: u64,
    /// Presence lookback window in days.
    #[serde(default = "default_presence_window")]
    pub presence_window_days: u64,
    /// Maximum activity events scanned per presence query.
    #[serde(default = "default_activity_scan_limit")]
    pub activity_scan_limit: i64,
    /// Maximum revocation events scanned per presence query.
    #[serde(default = "default_revocation_scan_limit")]
    pub revocation_scan_limit: i64,
    /// Interval of the expired-lockout sweep in seconds.
    #[serde(default = "default_sweep_interval")]
    pub lockout_sweep_interval_seconds: u64,
    /// Whether the lockout sweeper task is started. Disabled under test
    /// configuration.
    #[serde(default = "default_true")]
    pub lockout_sweep_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactive_ms_default: default_inactive_ms(),
            presence_window_days: default_presence_window(),
            activity_scan_limit: default_activity_scan_limit(),
            revocation_scan_limit: default_revocation_scan_limit(),
            lockout_sweep_interval_seconds: default_sweep_interval(),
            lockout_sweep_enabled: true,
        }
    }
}

fn default_inactive_ms() -> u64 {
    300_000
}

fn default_presence_window() -> u64 {
    30
}

fn default_activity_scan_limit() -> i64 {
    1000
}

fn default_revocation_scan_limit() -> i64 {
    200
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}
