//! Authentication event log repository — the append-only Event Log Store.
//!
//! Everything the session subsystem knows about sessions is derived from
//! this table. Rows are appended and queried, never mutated, with one
//! legacy exception: lazily backfilling resolved IP locations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use opsdeck_core::error::{AppError, ErrorKind};
use opsdeck_core::result::AppResult;
use opsdeck_entity::auth_event::{AuthAction, AuthEvent, CreateAuthEvent};

/// Repository for the authentication event log.
#[derive(Debug, Clone)]
pub struct AuthEventRepository {
    pool: PgPool,
}

impl AuthEventRepository {
    /// Create a new auth event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a new event to the log.
    pub async fn append(&self, data: &CreateAuthEvent) -> AppResult<AuthEvent> {
        sqlx::query_as::<_, AuthEvent>(
            "INSERT INTO auth_events (user_id, action, module, description, ip_address, user_agent, ip_location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.action)
        .bind(&data.module)
        .bind(&data.description)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.ip_location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append auth event", e))
    }

    /// Fetch `login`/`heartbeat` activity for a user since a cutoff, newest
    /// first, capped at `limit` rows.
    pub async fn find_activity(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AuthEvent>> {
        sqlx::query_as::<_, AuthEvent>(
            "SELECT * FROM auth_events \
             WHERE user_id = $1 AND action IN ('login', 'heartbeat') AND created_at >= $2 \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch activity events", e))
    }

    /// Fetch `force_logout`/`force_logout_session` events for a user since a
    /// cutoff, newest first, capped at `limit` rows.
    pub async fn find_revocations(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AuthEvent>> {
        sqlx::query_as::<_, AuthEvent>(
            "SELECT * FROM auth_events \
             WHERE user_id = $1 AND action IN ('force_logout', 'force_logout_session') \
             AND created_at >= $2 \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch revocation events", e)
        })
    }

    /// Fetch the most recent event of a given action for a user.
    pub async fn latest_by_action(
        &self,
        user_id: i64,
        action: AuthAction,
    ) -> AppResult<Option<AuthEvent>> {
        sqlx::query_as::<_, AuthEvent>(
            "SELECT * FROM auth_events WHERE user_id = $1 AND action = $2 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(action)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch latest event", e))
    }

    /// Fetch the most recent `heartbeat` or `login` event for a user.
    pub async fn latest_activity(&self, user_id: i64) -> AppResult<Option<AuthEvent>> {
        sqlx::query_as::<_, AuthEvent>(
            "SELECT * FROM auth_events \
             WHERE user_id = $1 AND action IN ('login', 'heartbeat') \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch latest activity", e)
        })
    }

    /// Fetch the most recent session-level revocation tagged with the given
    /// session identifier, if any.
    pub async fn find_session_revocation(
        &self,
        user_id: i64,
        session_id: Uuid,
    ) -> AppResult<Option<AuthEvent>> {
        sqlx::query_as::<_, AuthEvent>(
            "SELECT * FROM auth_events \
             WHERE user_id = $1 AND action = 'force_logout_session' AND description LIKE $2 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(format!("%session:{session_id}%"))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch session revocation", e)
        })
    }

    /// Backfill a resolved location onto rows that recorded this IP without
    /// one. Best effort; the resolved label is also memoized in-process.
    pub async fn backfill_location(
        &self,
        user_id: i64,
        ip_address: &str,
        location: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE auth_events SET ip_location = $3 \
             WHERE user_id = $1 AND ip_address = $2 AND ip_location IS NULL",
        )
        .bind(user_id)
        .bind(ip_address)
        .bind(location)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to backfill ip location", e)
        })?;
        Ok(result.rows_affected())
    }
}
