//! The push hub — registration and fan-out of realtime events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use opsdeck_core::config::RealtimeConfig;
use opsdeck_database::repositories::NotificationRepository;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::OutboundMessage;

/// Maintains the per-user socket registry and pushes events to clients.
pub struct PushHub {
    /// Socket registry.
    pool: Arc<ConnectionPool>,
    /// Notification rows for count computation.
    notifications: Arc<NotificationRepository>,
    /// Buffer sizing.
    config: RealtimeConfig,
}

impl std::fmt::Debug for PushHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushHub")
            .field("connections", &self.pool.connection_count())
            .finish()
    }
}

impl PushHub {
    /// Creates a new push hub.
    pub fn new(notifications: Arc<NotificationRepository>, config: RealtimeConfig) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            notifications,
            config,
        }
    }

    /// Registers a new authenticated connection for a user.
    ///
    /// Returns the connection handle and the receiver the transport task
    /// drains into the socket.
    pub fn register(&self, user_id: i64) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));
        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            user_id,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection. The user's registry entry disappears with
    /// their last connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();
            info!(
                conn_id = %conn_id,
                user_id = handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Counts currently-valid published notifications.
    ///
    /// No department filtering: this is the number broadcast to every
    /// socket (see DESIGN.md for the asymmetry with the REST path). Count
    /// failures degrade to zero.
    pub async fn compute_unread_count(&self) -> i64 {
        match self.notifications.count_published(Utc::now()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Unread count failed, broadcasting zero");
                0
            }
        }
    }

    /// Sends the current unread count to one connection (used right after
    /// registration).
    pub async fn send_count_to(&self, handle: &ConnectionHandle) {
        let count = self.compute_unread_count().await;
        self.send_raw(handle, &OutboundMessage::Count { count });
    }

    /// Recomputes the unread count and broadcasts it to all connections.
    pub async fn broadcast_count(&self) {
        let count = self.compute_unread_count().await;
        let message = OutboundMessage::Count { count };
        for handle in self.pool.all_connections() {
            self.send_raw(&handle, &message);
        }
    }

    /// Broadcasts a refresh signal to all connections.
    pub fn broadcast_refresh(&self) {
        for handle in self.pool.all_connections() {
            self.send_raw(&handle, &OutboundMessage::Refresh);
        }
    }

    /// Delivers a message to one user's connections only.
    pub fn send_message_to_user(&self, user_id: i64, message: &OutboundMessage) {
        let connections = self.pool.get_user_connections(user_id);
        if connections.is_empty() {
            return;
        }
        for handle in &connections {
            self.send_raw(handle, message);
        }
    }

    /// Serializes and queues a message on one connection, swallowing
    /// failures.
    fn send_raw(&self, handle: &ConnectionHandle, message: &OutboundMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return;
            }
        };
        handle.send(payload);
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Checks if a user currently has any connection.
    pub fn is_user_connected(&self, user_id: i64) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Registry behavior is testable without a database: the notification
    // repository is only touched by count computation.
    fn hub() -> PushHub {
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/unused");
        PushHub::new(
            Arc::new(NotificationRepository::new(pool.unwrap())),
            RealtimeConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_targeted_send_reaches_only_that_user() {
        let hub = hub();
        let (_alice, mut alice_rx) = hub.register(1);
        let (_bob, mut bob_rx) = hub.register(2);

        hub.send_message_to_user(1, &OutboundMessage::Refresh);

        let received = alice_rx.recv().await.unwrap();
        assert!(received.contains("refresh"));
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_refresh_reaches_all() {
        let hub = hub();
        let (_a, mut rx_a) = hub.register(1);
        let (_b, mut rx_b) = hub.register(2);

        hub.broadcast_refresh();

        assert!(rx_a.recv().await.unwrap().contains("refresh"));
        assert!(rx_b.recv().await.unwrap().contains("refresh"));
    }

    #[tokio::test]
    async fn test_unregister_drops_user_entry() {
        let hub = hub();
        let (handle_a, _rx_a) = hub.register(1);
        let (handle_b, _rx_b) = hub.register(1);
        assert_eq!(hub.user_count(), 1);
        assert_eq!(hub.connection_count(), 2);

        hub.unregister(&handle_a.id);
        assert!(hub.is_user_connected(1));

        hub.unregister(&handle_b.id);
        assert!(!hub.is_user_connected(1));
        assert_eq!(hub.user_count(), 0);
    }

    #[tokio::test]
    async fn test_send_to_dropped_receiver_is_swallowed() {
        let hub = hub();
        let (handle, rx) = hub.register(1);
        drop(rx);

        // Must not panic or error; the connection is marked dead instead.
        hub.send_message_to_user(1, &OutboundMessage::Refresh);
        assert!(!handle.is_alive());
    }
}
