//! Connection pool — tracks all active connections indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe registry of all active WebSocket connections.
///
/// A user's entry is dropped as soon as their last connection goes away, so
/// the map never accumulates empty sets.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → connection handles (one user can have multiple devices).
    by_user: DashMap<i64, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
            by_id: DashMap::new(),
        }
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        if let Some((_, handle)) = self.by_id.remove(conn_id) {
            if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
                connections.retain(|c| c.id != *conn_id);
                if connections.is_empty() {
                    drop(connections);
                    self.by_user.remove(&handle.user_id);
                }
            }
            Some(handle)
        } else {
            None
        }
    }

    /// Gets all connections for a user.
    pub fn get_user_connections(&self, user_id: i64) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(user_id: i64) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(ConnectionHandle::new(user_id, tx))
    }

    #[test]
    fn test_add_and_remove() {
        let pool = ConnectionPool::new();
        let h = handle(1);
        pool.add(h.clone());

        assert_eq!(pool.connection_count(), 1);
        assert_eq!(pool.user_count(), 1);

        pool.remove(&h.id);
        assert_eq!(pool.connection_count(), 0);
        assert_eq!(pool.user_count(), 0);
    }

    #[test]
    fn test_user_entry_dropped_when_last_connection_leaves() {
        let pool = ConnectionPool::new();
        let a = handle(1);
        let b = handle(1);
        pool.add(a.clone());
        pool.add(b.clone());

        pool.remove(&a.id);
        assert_eq!(pool.user_count(), 1);
        assert_eq!(pool.get_user_connections(1).len(), 1);

        pool.remove(&b.id);
        assert_eq!(pool.user_count(), 0);
        assert!(pool.get_user_connections(1).is_empty());
    }
}
