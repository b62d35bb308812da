use std::sync::Arc;

use keyfront_events::EventBus;

use crate::config::ServerConfig;
use crate::engine::RequestEngine;
use crate::ws::RoomHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keyfront_db::DbPool,
    /// Server configuration (accessed by auth extractors and handlers).
    pub config: Arc<ServerConfig>,
    /// Tenant-scoped WebSocket room hub.
    pub hub: Arc<RoomHub>,
    /// Centralized event bus for publishing marketplace events.
    pub event_bus: Arc<EventBus>,
    /// Viewing-request lifecycle engine.
    pub engine: Arc<RequestEngine>,
}
