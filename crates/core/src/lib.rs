//! Keyfront domain core.
//!
//! Pure domain types shared by every other crate: tenant identifiers and
//! roles, room naming for the fan-out hub, the viewing-request state
//! machine, branding tiers, and the shared error type. No I/O lives here.

pub mod error;
pub mod listing;
pub mod request;
pub mod roles;
pub mod rooms;
pub mod tier;
pub mod types;
