//! WebSocket infrastructure for real-time fan-out.
//!
//! Provides the tenant-scoped room hub, heartbeat monitoring, and the
//! authenticated HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{RoomHub, SessionContext};
