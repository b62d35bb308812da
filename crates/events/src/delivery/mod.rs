//! Outbound delivery channels for marketplace notifications.
//!
//! Currently email only. Every delivery is best effort: attempted once,
//! never retried, and failures are reported as a result value rather than
//! an error so callers can log and move on.

pub mod email;
