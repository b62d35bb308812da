//! Handlers for the public storefront API. No authentication; everything
//! here is scoped by the agency id in the path or by explicit query ids.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use keyfront_core::error::CoreError;
use keyfront_db::models::listing::ListingSearchFilters;
use keyfront_db::repositories::{ListingRepo, ProfileRepo};
use serde::Deserialize;
use serde_json::json;

use crate::engine::CreateRequestPayload;
use crate::error::AppResult;
use crate::response::ok_with;
use crate::state::AppState;

/// Maximum number of agencies a single cross-agency search may span.
const MAX_SEARCH_AGENCIES: usize = 3;

/// Maximum number of listings in a comparison.
const MAX_COMPARE_IDS: i64 = 4;

/// Number of featured listings on the marketplace homepage.
const FEATURED_LIMIT: i64 = 6;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /public/listings`.
#[derive(Debug, Deserialize)]
pub struct PublicSearchQuery {
    #[serde(rename = "agencyIds")]
    pub agency_ids: Option<String>,
    pub parish: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
}

/// Query parameters for `GET /public/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub ids: Option<String>,
}

// ---------------------------------------------------------------------------
// Agency storefront
// ---------------------------------------------------------------------------

/// GET /api/v1/public/agency/{agency_id}
///
/// The agency's public storefront card.
pub async fn get_agency(
    State(state): State<AppState>,
    Path(agency_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let agency = ProfileRepo::find_agency_card(&state.pool, &agency_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Agency",
            id: agency_id,
        })?;
    Ok(ok_with("agency", agency))
}

/// GET /api/v1/public/agency/{agency_id}/listings
///
/// Available listings for one agency, featured first.
pub async fn get_agency_listings(
    State(state): State<AppState>,
    Path(agency_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let listings = ListingRepo::list_public_for_agency(&state.pool, &agency_id).await?;
    Ok(ok_with("listings", listings))
}

/// GET /api/v1/public/listings?agencyIds=a,b,c
///
/// Cross-agency search with optional attribute filters.
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<PublicSearchQuery>,
) -> AppResult<impl IntoResponse> {
    let agency_ids: Vec<String> = query
        .agency_ids
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .take(MAX_SEARCH_AGENCIES)
        .collect();
    if agency_ids.is_empty() {
        return Err(CoreError::Validation("agencyIds query required".into()).into());
    }

    let filters = ListingSearchFilters {
        parish: query.parish,
        property_type: query.property_type,
        min_price: query.min_price,
        max_price: query.max_price,
        min_bedrooms: query.bedrooms,
        min_bathrooms: query.bathrooms,
    };
    let listings = ListingRepo::search_public(&state.pool, &agency_ids, &filters).await?;
    Ok(ok_with("listings", listings))
}

/// GET /api/v1/public/listings/{listing_id}
///
/// Listing detail plus the owning realtor's public contact card.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingRepo::find_by_listing_id(&state.pool, &listing_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })?;

    let realtor =
        ProfileRepo::find_realtor_card(&state.pool, &listing.agency_id, &listing.realtor_id)
            .await?;

    let mut body = serde_json::to_value(&listing).unwrap_or_default();
    if let Some(object) = body.as_object_mut() {
        object.insert("realtor".to_string(), json!(realtor));
    }
    Ok(ok_with("listing", body))
}

/// GET /api/v1/public/compare?ids=a,b,c,d
///
/// Up to four listings for side-by-side comparison.
pub async fn compare_listings(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> AppResult<impl IntoResponse> {
    let ids: Vec<String> = query
        .ids
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .take(MAX_COMPARE_IDS as usize)
        .collect();
    if ids.is_empty() {
        return Err(CoreError::Validation("ids query required".into()).into());
    }

    let listings = ListingRepo::list_by_ids(&state.pool, &ids, MAX_COMPARE_IDS).await?;
    Ok(ok_with("listings", listings))
}

/// GET /api/v1/public/featured
///
/// Featured available listings for the marketplace homepage.
pub async fn featured_listings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let listings = ListingRepo::list_featured(&state.pool, FEATURED_LIMIT).await?;
    Ok(ok_with("listings", listings))
}

// ---------------------------------------------------------------------------
// Viewing requests
// ---------------------------------------------------------------------------

/// POST /api/v1/public/agency/{agency_id}/requests
///
/// Create a viewing request from an anonymous storefront visitor. The
/// response reflects only the persistence outcome; realtime fan-out and
/// email happen in the background.
pub async fn create_request(
    State(state): State<AppState>,
    Path(agency_id): Path<String>,
    Json(payload): Json<CreateRequestPayload>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.create_request(&agency_id, payload).await?;
    Ok((StatusCode::CREATED, ok_with("request", request)))
}
