//! Profile entity model and DTOs.

use keyfront_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profiles` table.
///
/// The password hash never leaves the server; it is skipped on
/// serialization so profiles can be returned to clients directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub role: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub profile_email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub branding_tier: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public storefront card for an agency: the subset of profile columns a
/// visitor may see.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AgencyCard {
    pub agency_id: String,
    pub display_name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub profile_email: Option<String>,
}

/// Public contact card for the realtor shown on a listing detail page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RealtorCard {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub logo_url: Option<String>,
}

/// Insert DTO for a new profile. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub role: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub profile_email: Option<String>,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub branding_tier: String,
}

/// Fields a realtor may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileBrandingUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}

/// Fields a platform admin may change on any profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileAdminUpdate {
    pub status: Option<String>,
    pub branding_tier: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}
