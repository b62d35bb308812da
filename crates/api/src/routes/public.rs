//! Route definitions for the public storefront API. No authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`.
///
/// ```text
/// GET  /agency/{agency_id}            -> get_agency
/// GET  /agency/{agency_id}/listings   -> get_agency_listings
/// POST /agency/{agency_id}/requests   -> create_request
/// GET  /listings                      -> search_listings
/// GET  /listings/{listing_id}         -> get_listing
/// GET  /compare                       -> compare_listings
/// GET  /featured                      -> featured_listings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agency/{agency_id}", get(public::get_agency))
        .route(
            "/agency/{agency_id}/listings",
            get(public::get_agency_listings),
        )
        .route("/agency/{agency_id}/requests", post(public::create_request))
        .route("/listings", get(public::search_listings))
        .route("/listings/{listing_id}", get(public::get_listing))
        .route("/compare", get(public::compare_listings))
        .route("/featured", get(public::featured_listings))
}
