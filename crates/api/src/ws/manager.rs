use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use keyfront_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Authenticated identity attached to a live connection.
///
/// Transient: created at the handshake, dropped on disconnect. A
/// reconnect simply re-authenticates and rejoins its rooms.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub role: String,
    pub agency_id: Option<String>,
    pub realtor_id: Option<String>,
}

/// Metadata for a single WebSocket connection.
pub struct Connection {
    /// Who is on the other end.
    pub session: SessionContext,
    /// Rooms the connection receives events for. Computed once at the
    /// handshake from the session's claims.
    pub rooms: HashSet<String>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Tenant-scoped fan-out hub over all active WebSocket connections.
///
/// The room membership table is the hub's only shared mutable state and is
/// owned entirely by this struct; callers interact through
/// `add`/`remove`/`publish`. Thread-safe via interior `RwLock`; designed
/// to be wrapped in `Arc` and shared across the application.
pub struct RoomHub {
    connections: RwLock<HashMap<String, Connection>>,
}

impl RoomHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new authenticated connection with its room memberships.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        session: SessionContext,
        rooms: Vec<String>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection {
            session,
            rooms: rooms.into_iter().collect(),
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, releasing all room memberships.
    /// Idempotent: removing an unknown ID is a no-op.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Deliver a JSON frame to every connection joined to `room`.
    ///
    /// Best effort: a room with zero members is a no-op, connections whose
    /// send channels are closed are silently skipped (they will be cleaned
    /// up on their next receive loop iteration), and nothing is buffered
    /// for later delivery. Never blocks on socket I/O -- frames go through
    /// the per-connection channel. Returns the number of connections the
    /// frame was handed to.
    pub async fn publish(&self, room: &str, frame: &serde_json::Value) -> usize {
        let text = frame.to_string();
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if !conn.rooms.contains(room) {
                continue;
            }
            if conn.sender.send(Message::Text(text.clone().into())).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return the number of connections currently joined to `room`.
    pub async fn room_member_count(&self, room: &str) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.rooms.contains(room))
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}
