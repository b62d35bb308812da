//! Handlers for the platform admin console.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use keyfront_core::error::CoreError;
use keyfront_core::roles::{ROLE_AGENCY_ADMIN, ROLE_PLATFORM_ADMIN};
use keyfront_core::types::DbId;
use keyfront_db::models::profile::{NewProfile, Profile, ProfileAdminUpdate};
use keyfront_db::repositories::{ListingRepo, ProfileRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::engine::RequestQuery;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ok_merged, ok_with};
use crate::state::AppState;

/// Default page size for the agencies listing.
const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum page size for the agencies listing.
const MAX_PAGE_SIZE: i64 = 100;

/// Default cap for admin listing queries.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Hard cap for admin listing queries.
const MAX_LIST_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /admin/login`.
#[derive(Debug, Deserialize)]
pub struct AdminLoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query parameters for `GET /admin/listings`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListingQuery {
    pub agency_id: Option<String>,
    pub realtor_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Query parameters for `GET /admin/agencies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

/// Body of `POST /admin/agencies`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgencyProfileBody {
    pub role: Option<String>,
    #[validate(length(min = 1))]
    pub agency_id: String,
    #[validate(length(min = 1))]
    pub realtor_id: String,
    #[validate(email)]
    pub profile_email: Option<String>,
    pub password: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub branding_tier: Option<String>,
}

/// Body of `POST /admin/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub agency_id: Option<String>,
    pub realtor_id: Option<String>,
    pub profile_email: Option<String>,
    pub password: Option<String>,
}

/// One agency with its member profiles, for the admin console.
#[derive(Debug, Serialize)]
struct AgencyGroup {
    agency_id: String,
    members: Vec<Profile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgencyListResponse {
    page: i64,
    page_size: i64,
    agencies: Vec<AgencyGroup>,
    total: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/login
///
/// Authenticate the platform admin against environment-configured
/// credentials and issue an unscoped admin token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<AdminLoginBody>,
) -> AppResult<impl IntoResponse> {
    let username = body.username.as_deref().unwrap_or("");
    let password = body.password.as_deref().unwrap_or("");

    let admin = &state.config.admin;
    let valid_user =
        username == admin.username || admin.email.as_deref().is_some_and(|e| e == username);
    let valid_pass = !password.is_empty() && password == admin.password;
    if !valid_user || !valid_pass {
        return Err(CoreError::Unauthorized("Invalid admin credentials".into()).into());
    }

    let token = generate_access_token(0, ROLE_PLATFORM_ADMIN, None, None, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(username, "Platform admin login");
    Ok(ok_with("token", token))
}

/// GET /api/v1/admin/requests
///
/// Requests across all tenants with optional agency/realtor/status filters.
pub async fn list_requests(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = state.engine.list_requests(&user, &query).await?;
    Ok(ok_with("requests", requests))
}

/// GET /api/v1/admin/listings
///
/// Listings across all tenants with optional filters and search.
pub async fn list_listings(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminListingQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let listings = ListingRepo::list_admin(
        &state.pool,
        query.agency_id.as_deref(),
        query.realtor_id.as_deref(),
        query.status.as_deref(),
        query.search.as_deref(),
        limit,
    )
    .await?;
    Ok(ok_with("listings", listings))
}

/// GET /api/v1/admin/agencies
///
/// Profiles grouped by agency, with paging, search, and status filter.
pub async fn list_agencies(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AgencyListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * page_size;

    let profiles = ProfileRepo::list(
        &state.pool,
        query.search.as_deref(),
        query.status.as_deref(),
        page_size,
        offset,
    )
    .await?;
    let total = profiles.len();

    let mut grouped: BTreeMap<String, AgencyGroup> = BTreeMap::new();
    for profile in profiles {
        grouped
            .entry(profile.agency_id.clone())
            .or_insert_with(|| AgencyGroup {
                agency_id: profile.agency_id.clone(),
                members: Vec::new(),
            })
            .members
            .push(profile);
    }

    Ok(ok_merged(AgencyListResponse {
        page,
        page_size,
        agencies: grouped.into_values().collect(),
        total,
    }))
}

/// POST /api/v1/admin/agencies
///
/// Create a portal profile. The password is hashed before storage; a
/// duplicate (agency, realtor) pair yields 409.
pub async fn create_agency_profile(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateAgencyProfileBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    validate_password_strength(&body.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    let password_hash = hash_password(&body.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let input = NewProfile {
        role: body.role.unwrap_or_else(|| ROLE_AGENCY_ADMIN.to_string()),
        agency_id: body.agency_id,
        realtor_id: body.realtor_id,
        profile_email: body.profile_email,
        password_hash,
        display_name: body.display_name,
        phone: body.phone,
        whatsapp: body.whatsapp,
        branding_tier: body.branding_tier.unwrap_or_else(|| "starter".to_string()),
    };
    let profile = ProfileRepo::insert(&state.pool, &input).await?;
    Ok(ok_with("profile", profile))
}

/// PATCH /api/v1/admin/agencies/{profile_id}
///
/// Update the allow-listed admin fields on any profile.
pub async fn update_agency_profile(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(profile_id): Path<DbId>,
    Json(update): Json<ProfileAdminUpdate>,
) -> AppResult<impl IntoResponse> {
    let profile = ProfileRepo::update_admin(&state.pool, profile_id, &update)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Profile",
            id: profile_id.to_string(),
        })?;
    Ok(ok_with("profile", profile))
}

/// POST /api/v1/admin/reset-password
///
/// Reset a profile's password by (agency, realtor) pair or by email.
pub async fn reset_password(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> AppResult<impl IntoResponse> {
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CoreError::Validation("password required".into()))?;
    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(CoreError::Validation)?;

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let updated = match (&body.agency_id, &body.realtor_id, &body.profile_email) {
        (Some(agency_id), Some(realtor_id), _) => {
            ProfileRepo::reset_password_by_ids(&state.pool, agency_id, realtor_id, &password_hash)
                .await?
        }
        (_, _, Some(profile_email)) => {
            ProfileRepo::reset_password_by_email(&state.pool, profile_email, &password_hash)
                .await?
        }
        _ => {
            return Err(CoreError::Validation(
                "agency_id + realtor_id or profile_email required".into(),
            )
            .into());
        }
    };

    Ok(ok_with("updated", updated))
}
