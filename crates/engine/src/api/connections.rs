//! Connection management for WebSocket clients.
//!
//! Tracks which authenticated user each live socket belongs to and delivers
//! outbound events to one connection or to every connection of a user.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use hexrealm_domain::{ConnectionId, UserId};
use hexrealm_shared::ServerMessage;

use crate::infrastructure::ports::EventSink;

/// Information about a connected client.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            user_id,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(%connection_id, %user_id, "Connection registered");
    }

    /// Unregister a connection. Returns how many connections the user still has.
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<(UserId, usize)> {
        let mut connections = self.connections.write().await;
        let (info, _) = connections.remove(&connection_id)?;
        let remaining = connections
            .values()
            .filter(|(other, _)| other.user_id == info.user_id)
            .count();
        tracing::debug!(%connection_id, user_id = %info.user_id, remaining, "Connection unregistered");
        Some((info.user_id, remaining))
    }

    pub async fn get(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| *info)
    }

    pub async fn user_connection_count(&self, user_id: UserId) -> usize {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|(info, _)| info.user_id == user_id)
            .count()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for ConnectionManager {
    async fn send_to_connection(&self, connection_id: ConnectionId, message: ServerMessage) {
        let connections = self.connections.read().await;
        let Some((_, sender)) = connections.get(&connection_id) else {
            tracing::debug!(%connection_id, event = message.event_name(), "Dropping event for closed connection");
            return;
        };
        if let Err(e) = sender.try_send(message) {
            tracing::warn!(%connection_id, error = %e, "Failed to send event");
        }
    }

    async fn send_to_user(&self, user_id: UserId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.user_id == user_id {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to send event to user"
                    );
                }
            }
        }
    }
}
