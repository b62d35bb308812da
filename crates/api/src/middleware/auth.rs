//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use keyfront_core::error::CoreError;
use keyfront_core::roles::{ROLE_AGENCY_ADMIN, ROLE_PLATFORM_ADMIN, ROLE_REALTOR};
use keyfront_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(agency_id = ?user.agency_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's profile row id (`0` for the platform admin).
    pub profile_id: DbId,
    /// The caller's role (`realtor`, `agency_admin`, `platform_admin`).
    pub role: String,
    /// Owning agency; `None` for platform admins.
    pub agency_id: Option<String>,
    /// The caller's own realtor id; `None` for platform admins.
    pub realtor_id: Option<String>,
}

impl AuthUser {
    pub fn is_platform_admin(&self) -> bool {
        self.role == ROLE_PLATFORM_ADMIN
    }

    pub fn is_agency_admin(&self) -> bool {
        self.role == ROLE_AGENCY_ADMIN
    }

    pub fn is_realtor(&self) -> bool {
        self.role == ROLE_REALTOR
    }

    /// The synthetic identity used for admin API-key access.
    pub fn platform_admin() -> Self {
        Self {
            profile_id: 0,
            role: ROLE_PLATFORM_ADMIN.to_string(),
            agency_id: None,
            realtor_id: None,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            profile_id: claims.sub,
            role: claims.role,
            agency_id: claims.agency_id,
            realtor_id: claims.realtor_id,
        })
    }
}
