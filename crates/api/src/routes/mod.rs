pub mod admin;
pub mod health;
pub mod public;
pub mod realtor;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                          WebSocket (token in query)
///
/// /public/agency/{agency_id}                   agency storefront card
/// /public/agency/{agency_id}/listings          agency listings
/// /public/agency/{agency_id}/requests          create viewing request (POST)
/// /public/listings                             cross-agency search
/// /public/listings/{listing_id}                listing detail
/// /public/compare                              side-by-side comparison
/// /public/featured                             featured listings
///
/// /realtor/login                               portal login (public)
/// /realtor/me                                  own profile
/// /realtor/profile                             branding update (PATCH)
/// /realtor/listings                            list, upsert
/// /realtor/listings/{id}                       archive (DELETE)
/// /realtor/listings/{id}/archive               archive (POST)
/// /realtor/listings/{id}/toggle-featured       toggle featured (POST)
/// /realtor/requests                            scoped request list
/// /realtor/requests/{id}/status                status change (POST)
///
/// /admin/login                                 admin login (public)
/// /admin/requests                              cross-tenant request list
/// /admin/listings                              cross-tenant listing list
/// /admin/agencies                              list, create
/// /admin/agencies/{profile_id}                 update (PATCH)
/// /admin/reset-password                        reset a profile password
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Public storefront API.
        .nest("/public", public::router())
        // Realtor portal.
        .nest("/realtor", realtor::router())
        // Platform admin console.
        .nest("/admin", admin::router())
}
