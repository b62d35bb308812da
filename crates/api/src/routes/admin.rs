//! Route definitions for the platform admin console. All endpoints except
//! login require a platform-admin token or the service API key.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST  /login                    -> login (public)
/// GET   /requests                 -> list_requests
/// GET   /listings                 -> list_listings
/// GET   /agencies                 -> list_agencies
/// POST  /agencies                 -> create_agency_profile
/// PATCH /agencies/{profile_id}    -> update_agency_profile
/// POST  /reset-password           -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin::login))
        .route("/requests", get(admin::list_requests))
        .route("/listings", get(admin::list_listings))
        .route(
            "/agencies",
            get(admin::list_agencies).post(admin::create_agency_profile),
        )
        .route("/agencies/{profile_id}", patch(admin::update_agency_profile))
        .route("/reset-password", post(admin::reset_password))
}
