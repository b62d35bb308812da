//! Listing entity model and DTOs.

use keyfront_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Listing {
    pub id: DbId,
    pub listing_id: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub parish: Option<String>,
    pub community: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub image_urls: serde_json::Value,
    pub video_url: Option<String>,
    pub featured: bool,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new listing. Tenant columns come from the
/// authenticated caller, never from the payload.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub listing_id: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub parish: Option<String>,
    pub community: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub image_urls: serde_json::Value,
    pub video_url: Option<String>,
    pub featured: bool,
}

/// Partial update for an existing listing; `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub parish: Option<String>,
    pub community: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub image_urls: Option<serde_json::Value>,
    pub video_url: Option<String>,
    pub featured: Option<bool>,
}

/// Storefront search filters over one or more agencies.
#[derive(Debug, Clone, Default)]
pub struct ListingSearchFilters {
    pub parish: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
}
