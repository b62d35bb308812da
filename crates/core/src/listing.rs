//! Listing domain constants and identifier generation.

/// A listing visible on the storefront.
pub const LISTING_STATUS_AVAILABLE: &str = "available";

/// A listing withdrawn from the storefront. Listings are never hard
/// deleted; archival keeps request history intact.
pub const LISTING_STATUS_ARCHIVED: &str = "archived";

/// Actions carried by `listing.updated` events.
pub const LISTING_ACTION_CREATED: &str = "created";
pub const LISTING_ACTION_UPDATED: &str = "updated";
pub const LISTING_ACTION_ARCHIVED: &str = "archived";

/// Generate a new listing id from the current millisecond clock.
pub fn generate_listing_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    format!("LST-{tail}")
}
