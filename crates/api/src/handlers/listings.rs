//! Handlers for the realtor portal's `/realtor/listings` resource.
//!
//! Every mutation publishes a `listing.updated` event so agency dashboards
//! refresh in real time.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use keyfront_core::error::CoreError;
use keyfront_core::listing::{
    generate_listing_id, LISTING_ACTION_ARCHIVED, LISTING_ACTION_CREATED, LISTING_ACTION_UPDATED,
};
use keyfront_core::tier::BrandingTier;
use keyfront_db::models::listing::{Listing, ListingUpdate, NewListing};
use keyfront_db::repositories::{ListingRepo, ProfileRepo};
use keyfront_events::bus::LISTING_UPDATED;
use keyfront_events::MarketEvent;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireRealtor;
use crate::response::{ok_merged, ok_with};
use crate::state::AppState;

/// Body of `POST /realtor/listings`. With a known `listing_id` this is an
/// update; otherwise a create. Tenant columns always come from the token.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpsertListingPayload {
    pub listing_id: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub parish: Option<String>,
    pub community: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub bathrooms: Option<i32>,
    pub image_urls: Option<serde_json::Value>,
    pub video_url: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, serde::Serialize)]
struct UpsertResponse {
    listing: Listing,
    mode: &'static str,
}

/// GET /api/v1/realtor/listings
///
/// The caller's own listings, newest first.
pub async fn list_my_listings(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let (agency_id, realtor_id) = tenant_scope(&user)?;
    let listings = ListingRepo::list_for_realtor(&state.pool, agency_id, realtor_id).await?;
    Ok(ok_with("listings", listings))
}

/// POST /api/v1/realtor/listings
///
/// Create or update a listing. Creation is subject to the caller's
/// branding-tier quota; hitting the cap yields 403.
pub async fn upsert_listing(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Json(payload): Json<UpsertListingPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    let (agency_id, realtor_id) = tenant_scope(&user)?;

    let existing = match payload.listing_id.as_deref().filter(|id| !id.is_empty()) {
        Some(listing_id) => ListingRepo::find_scoped(&state.pool, listing_id, agency_id).await?,
        None => None,
    };

    if let Some(existing) = existing {
        let update = ListingUpdate {
            title: payload.title,
            description: payload.description,
            price: payload.price,
            property_type: payload.property_type,
            parish: payload.parish,
            community: payload.community,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            image_urls: payload.image_urls,
            video_url: payload.video_url,
            featured: payload.featured,
        };
        let listing =
            ListingRepo::update(&state.pool, &existing.listing_id, agency_id, &update)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    entity: "Listing",
                    id: existing.listing_id.clone(),
                })?;
        publish_listing_event(&state, &listing, LISTING_ACTION_UPDATED);
        return Ok(ok_merged(UpsertResponse {
            listing,
            mode: "updated",
        }));
    }

    // Creation: enforce the branding-tier quota first.
    let profile = ProfileRepo::find_by_id(&state.pool, user.profile_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Profile",
            id: user.profile_id.to_string(),
        })?;
    let tier = BrandingTier::parse(&profile.branding_tier);
    let held = ListingRepo::count_for_realtor(&state.pool, agency_id, realtor_id).await?;
    if held >= tier.max_listings() {
        return Err(CoreError::Forbidden("Listing limit reached for your plan".into()).into());
    }

    let input = NewListing {
        listing_id: payload
            .listing_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_listing_id),
        agency_id: agency_id.to_string(),
        realtor_id: realtor_id.to_string(),
        title: payload.title,
        description: payload.description,
        price: payload.price,
        property_type: payload.property_type,
        parish: payload.parish,
        community: payload.community,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        image_urls: payload.image_urls.unwrap_or_else(|| json!([])),
        video_url: payload.video_url,
        featured: payload.featured.unwrap_or(false),
    };
    let listing = ListingRepo::insert(&state.pool, &input).await?;
    publish_listing_event(&state, &listing, LISTING_ACTION_CREATED);
    Ok(ok_merged(UpsertResponse {
        listing,
        mode: "created",
    }))
}

/// DELETE /api/v1/realtor/listings/{listing_id} and
/// POST /api/v1/realtor/listings/{listing_id}/archive
///
/// Archive a listing. Listings are never hard deleted.
pub async fn archive_listing(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (agency_id, _) = tenant_scope(&user)?;
    let listing = ListingRepo::archive(&state.pool, &listing_id, agency_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })?;
    publish_listing_event(&state, &listing, LISTING_ACTION_ARCHIVED);
    Ok(ok_with("listing", listing))
}

/// POST /api/v1/realtor/listings/{listing_id}/toggle-featured
pub async fn toggle_featured(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (agency_id, _) = tenant_scope(&user)?;
    let listing = ListingRepo::toggle_featured(&state.pool, &listing_id, agency_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })?;
    Ok(ok_with("listing", listing))
}

/// Tenant ids from the caller's claims. Portal tokens always carry both;
/// their absence means the token was minted for another audience.
fn tenant_scope(user: &AuthUser) -> Result<(&str, &str), CoreError> {
    match (user.agency_id.as_deref(), user.realtor_id.as_deref()) {
        (Some(agency_id), Some(realtor_id)) => Ok((agency_id, realtor_id)),
        _ => Err(CoreError::Forbidden("Caller has no agency scope".into())),
    }
}

/// Serialize the listing and hand it to the bus. Failures are logged and
/// swallowed; the write has already committed.
fn publish_listing_event(state: &AppState, listing: &Listing, action: &str) {
    match serde_json::to_value(listing) {
        Ok(value) => {
            let event = MarketEvent::new(LISTING_UPDATED, &listing.agency_id)
                .with_realtor(&listing.realtor_id)
                .with_payload(json!({ "listing": value, "action": action }));
            state.event_bus.publish(event);
        }
        Err(e) => {
            tracing::error!(
                listing_id = %listing.listing_id,
                error = %e,
                "Failed to serialize listing event"
            );
        }
    }
}
