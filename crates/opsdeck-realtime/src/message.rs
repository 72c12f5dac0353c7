//! Server-to-client WebSocket message definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opsdeck_entity::notification::Notification;

/// Messages pushed by the server to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Current count of valid published notifications.
    #[serde(rename = "count")]
    Count {
        /// The unread count.
        count: i64,
    },
    /// Generic "reload your data" signal after a notification mutation.
    #[serde(rename = "refresh")]
    Refresh,
    /// Targeted delivery of one notification to one user.
    #[serde(rename = "message:new")]
    MessageNew {
        /// Delivery identifier.
        id: i64,
        /// Notification title.
        title: String,
        /// Notification body.
        content: String,
        /// When the notification was sent.
        sent_at: Option<DateTime<Utc>>,
        /// Display priority.
        priority: String,
        /// Message category.
        message_type: String,
        /// Authoring user.
        sender_id: Option<i64>,
        /// Authoring user's display name.
        sender_name: Option<String>,
        /// The underlying notification row.
        notification_id: i64,
    },
}

impl OutboundMessage {
    /// Builds a targeted message payload from a notification row.
    pub fn message_new(notification: &Notification) -> Self {
        Self::MessageNew {
            id: notification.id,
            title: notification.title.clone(),
            content: notification.content.clone(),
            sent_at: notification.sent_at,
            priority: notification.priority.clone(),
            message_type: notification.message_type.clone(),
            sender_id: notification.sender_id,
            sender_name: notification.sender_name.clone(),
            notification_id: notification.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_tags() {
        let count = serde_json::to_value(OutboundMessage::Count { count: 3 }).unwrap();
        assert_eq!(count["type"], "count");
        assert_eq!(count["count"], 3);

        let refresh = serde_json::to_value(OutboundMessage::Refresh).unwrap();
        assert_eq!(refresh["type"], "refresh");
    }

    #[test]
    fn test_message_new_tag() {
        let msg = OutboundMessage::MessageNew {
            id: 9,
            title: "t".to_string(),
            content: "c".to_string(),
            sent_at: None,
            priority: "normal".to_string(),
            message_type: "announcement".to_string(),
            sender_id: None,
            sender_name: None,
            notification_id: 9,
        };
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(value["type"], "message:new");
        assert_eq!(value["notification_id"], 9);
    }
}
