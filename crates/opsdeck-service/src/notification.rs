//! Notification read path for the REST surface.
//!
//! Note the asymmetry with the realtime hub: this count filters published
//! notifications by the caller's department, while the hub's broadcast
//! count applies no department filter. Both behaviors are intentional until
//! product says otherwise; see DESIGN.md.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use opsdeck_core::result::AppResult;
use opsdeck_database::repositories::NotificationRepository;
use opsdeck_entity::notification::Notification;

use crate::context::RequestContext;

/// Read-side notification queries for authenticated users.
#[derive(Debug, Clone)]
pub struct NotificationReadService {
    /// Notification rows.
    notifications: Arc<NotificationRepository>,
}

impl NotificationReadService {
    /// Creates a new notification read service.
    pub fn new(notifications: Arc<NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Counts currently-valid published notifications visible to the
    /// caller's department. Count failures degrade to zero rather than
    /// failing the request.
    pub async fn unread_count(&self, ctx: &RequestContext) -> i64 {
        match self
            .notifications
            .count_published_for_department(Utc::now(), ctx.department_id)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(user_id = ctx.user_id, error = %e, "Unread count failed, returning zero");
                0
            }
        }
    }

    /// Fetches a notification for push delivery.
    pub async fn find(&self, id: i64) -> AppResult<Option<Notification>> {
        self.notifications.find_by_id(id).await
    }
}
