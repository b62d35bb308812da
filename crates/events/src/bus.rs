//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] decouples the request/response path from fan-out work: the
//! lifecycle engine publishes after a successful write and returns
//! immediately; the notification router consumes events on its own task.
//! Events are not persisted or replayed -- the database row is the system
//! of record, and a disconnected client catches up by polling it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event published after a viewing request is created.
pub const REQUEST_CREATED: &str = "request.created";

/// Event published after a viewing request's status changes.
pub const REQUEST_UPDATED: &str = "request.updated";

/// Event published after a listing is created, updated, or archived.
pub const LISTING_UPDATED: &str = "listing.updated";

// ---------------------------------------------------------------------------
// MarketEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the marketplace.
///
/// Constructed via [`MarketEvent::new`] and enriched with the builder
/// methods [`with_realtor`](MarketEvent::with_realtor) and
/// [`with_payload`](MarketEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Dot-separated event name, e.g. `"request.created"`.
    pub event_type: String,

    /// The owning agency -- every event is tenant-scoped.
    pub agency_id: String,

    /// The targeted realtor, when the event concerns one.
    pub realtor_id: Option<String>,

    /// Free-form JSON payload carrying the affected entity.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl MarketEvent {
    /// Create a new event for the given agency.
    pub fn new(event_type: impl Into<String>, agency_id: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            agency_id: agency_id.into(),
            realtor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the targeted realtor.
    pub fn with_realtor(mut self, realtor_id: impl Into<String>) -> Self {
        self.realtor_id = Some(realtor_id.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`MarketEvent`].
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Never blocks. If there are no active subscribers the event is
    /// silently dropped -- the persisted row already holds the state.
    pub fn publish(&self, event: MarketEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
