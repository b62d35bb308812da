//! Handlers for realtor portal authentication and profile management.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use keyfront_core::error::CoreError;
use keyfront_db::models::profile::{Profile, ProfileBrandingUpdate};
use keyfront_db::repositories::ProfileRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireRealtor;
use crate::response::{ok_merged, ok_with};
use crate::state::AppState;

/// Body of `POST /realtor/login`. The identifier may be an agency id, a
/// profile email, or a realtor id.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    profile: Profile,
}

/// POST /api/v1/realtor/login
///
/// Authenticate a portal profile and issue an access token scoped to its
/// agency and realtor ids.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> AppResult<impl IntoResponse> {
    let identifier = body.identifier.as_deref().unwrap_or("").trim();
    let password = body.password.as_deref().unwrap_or("");
    if identifier.is_empty() || password.is_empty() {
        return Err(CoreError::Unauthorized("Invalid credentials".into()).into());
    }

    let profile = ProfileRepo::find_login(&state.pool, identifier)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid credentials".into()))?;

    let password_valid = verify_password(password, &profile.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(CoreError::Unauthorized("Invalid credentials".into()).into());
    }

    let token = generate_access_token(
        profile.id,
        &profile.role,
        Some(&profile.agency_id),
        Some(&profile.realtor_id),
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(
        profile_id = profile.id,
        agency_id = %profile.agency_id,
        realtor_id = %profile.realtor_id,
        "Portal login"
    );

    Ok(ok_merged(LoginResponse { token, profile }))
}

/// GET /api/v1/realtor/me
///
/// The authenticated caller's own profile.
pub async fn me(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let profile = ProfileRepo::find_by_id(&state.pool, user.profile_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Profile",
            id: user.profile_id.to_string(),
        })?;
    Ok(ok_with("profile", profile))
}

/// PATCH /api/v1/realtor/profile
///
/// Update the caller's branding fields. Only the allow-listed columns in
/// [`ProfileBrandingUpdate`] can change through this endpoint.
pub async fn update_profile(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Json(update): Json<ProfileBrandingUpdate>,
) -> AppResult<impl IntoResponse> {
    let profile = ProfileRepo::update_branding(&state.pool, user.profile_id, &update)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Profile",
            id: user.profile_id.to_string(),
        })?;
    Ok(ok_with("profile", profile))
}
