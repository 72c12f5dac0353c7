//! Runtime settings repository.
//!
//! Settings live in the `system_configs` table as `{code, data}` rows with
//! a JSON payload, managed by the external configuration screens. Lookups
//! here are read-path only and degrade to defaults on any failure: a
//! missing or malformed row must never abort the surrounding request.

use sqlx::PgPool;
use tracing::warn;

/// Settings row code for the session idle threshold.
const AUTO_LOGOUT: &str = "auto_logout";
/// Settings row code for the concurrent device quota.
const MAX_LOGIN_DEVICES: &str = "max_login_devices";

/// Repository for runtime-tunable settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
    /// Fallback idle threshold when the `auto_logout` row is unusable.
    inactive_ms_default: u64,
}

impl SettingsRepository {
    /// Create a new settings repository.
    pub fn new(pool: PgPool, inactive_ms_default: u64) -> Self {
        Self {
            pool,
            inactive_ms_default,
        }
    }

    /// Fetch the raw JSON payload for a settings code.
    async fn fetch_data(&self, code: &str) -> Option<serde_json::Value> {
        let row: Result<Option<serde_json::Value>, sqlx::Error> =
            sqlx::query_scalar("SELECT data FROM system_configs WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await;

        match row {
            Ok(data) => data,
            Err(e) => {
                warn!(code = %code, error = %e, "Settings lookup failed, using default");
                None
            }
        }
    }

    /// The idle threshold in milliseconds after which a session counts as
    /// offline. Falls back to the configured default (300000 ms out of the
    /// box) when the row is missing, malformed, or non-positive.
    pub async fn inactive_ms(&self) -> u64 {
        match self.fetch_data(AUTO_LOGOUT).await {
            Some(data) => match data.get("inactive_ms").and_then(|v| v.as_u64()) {
                Some(ms) if ms > 0 => ms,
                _ => self.inactive_ms_default,
            },
            None => self.inactive_ms_default,
        }
    }

    /// The maximum number of simultaneously online sessions per account.
    /// `None` means unbounded (missing row, malformed payload, or a
    /// non-positive count).
    pub async fn max_login_devices(&self) -> Option<u32> {
        let data = self.fetch_data(MAX_LOGIN_DEVICES).await?;
        match data.get("count").and_then(|v| v.as_u64()) {
            Some(n) if n > 0 => Some(n as u32),
            _ => None,
        }
    }
}
