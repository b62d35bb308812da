//! Route definitions for the realtor portal. All endpoints except login
//! require a realtor or agency-admin token.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{listings, profile, requests};
use crate::state::AppState;

/// Routes mounted at `/realtor`.
///
/// ```text
/// POST   /login                                   -> login (public)
/// GET    /me                                      -> me
/// PATCH  /profile                                 -> update_profile
///
/// GET    /listings                                -> list_my_listings
/// POST   /listings                                -> upsert_listing
/// DELETE /listings/{listing_id}                   -> archive_listing
/// POST   /listings/{listing_id}/archive           -> archive_listing
/// POST   /listings/{listing_id}/toggle-featured   -> toggle_featured
///
/// GET    /requests                                -> list_requests
/// POST   /requests/{request_id}/status            -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(profile::login))
        .route("/me", get(profile::me))
        .route("/profile", patch(profile::update_profile))
        .route(
            "/listings",
            get(listings::list_my_listings).post(listings::upsert_listing),
        )
        .route(
            "/listings/{listing_id}",
            delete(listings::archive_listing),
        )
        .route(
            "/listings/{listing_id}/archive",
            post(listings::archive_listing),
        )
        .route(
            "/listings/{listing_id}/toggle-featured",
            post(listings::toggle_featured),
        )
        .route("/requests", get(requests::list_requests))
        .route(
            "/requests/{request_id}/status",
            post(requests::update_status),
        )
}
