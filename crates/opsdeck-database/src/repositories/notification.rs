//! Notification repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use opsdeck_core::error::{AppError, ErrorKind};
use opsdeck_core::result::AppResult;
use opsdeck_entity::notification::Notification;

/// Repository for system notifications (read-only in this subsystem).
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find notification", e)
            })
    }

    /// Count currently-valid published notifications: status `published`
    /// and `now` inside the optional start/end validity window.
    ///
    /// No department filtering: this is the count the realtime hub
    /// broadcasts to every connected socket.
    pub async fn count_published(&self, now: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications \
             WHERE status = 'published' \
             AND (start_time IS NULL OR start_time <= $1) \
             AND (end_time IS NULL OR end_time >= $1)",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
        })
    }

    /// Count currently-valid published notifications visible to one
    /// department (rows targeting that department or targeting everyone).
    ///
    /// This is the REST read-path variant; it deliberately differs from
    /// [`count_published`], see DESIGN.md.
    pub async fn count_published_for_department(
        &self,
        now: DateTime<Utc>,
        department_id: Option<i64>,
    ) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications \
             WHERE status = 'published' \
             AND (start_time IS NULL OR start_time <= $1) \
             AND (end_time IS NULL OR end_time >= $1) \
             AND (department_id IS NULL OR department_id = $2)",
        )
        .bind(now)
        .bind(department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to count department notifications",
                e,
            )
        })
    }
}
