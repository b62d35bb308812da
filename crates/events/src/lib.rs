//! Keyfront event bus and notification delivery.
//!
//! Building blocks for the marketplace's realtime pipeline:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MarketEvent`] — the canonical domain event envelope.
//! - [`delivery`] — best-effort email notification dispatch.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, MarketEvent};
pub use delivery::email::{DeliveryOutcome, EmailConfig, Mailer};
