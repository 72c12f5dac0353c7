//! System notification entity.
//!
//! Notification content management is external; the session core reads
//! these rows for unread counts and realtime push payloads only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Publication status of a system notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Not yet visible to users.
    Draft,
    /// Live, subject to the optional start/end validity window.
    Published,
    /// Retired.
    Archived,
}

/// A system notification row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: i64,
    /// Title shown to users.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Publication status.
    pub status: NotificationStatus,
    /// Display priority (`low`, `normal`, `high`, `urgent`).
    pub priority: String,
    /// Message category (`announcement`, `maintenance`, ...).
    pub message_type: String,
    /// Authoring user.
    pub sender_id: Option<i64>,
    /// Authoring user's display name, denormalized for push payloads.
    pub sender_name: Option<String>,
    /// Target department; `None` means all departments.
    pub department_id: Option<i64>,
    /// Validity window start; `None` means immediately valid.
    pub start_time: Option<DateTime<Utc>>,
    /// Validity window end; `None` means never expires.
    pub end_time: Option<DateTime<Utc>>,
    /// When the notification was sent/published.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}
