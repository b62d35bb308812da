//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the minimum requirement. Use these in route handlers to
//! enforce authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use keyfront_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `realtor` or `agency_admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn portal_only(RequireRealtor(user): RequireRealtor) -> AppResult<Json<()>> {
///     // user belongs to an agency here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireRealtor(pub AuthUser);

impl FromRequestParts<AppState> for RequireRealtor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_realtor() && !user.is_agency_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Realtor access required".into(),
            )));
        }
        Ok(RequireRealtor(user))
    }
}

/// Requires the `platform_admin` role, or a matching `x-admin-api-key`
/// header when a service API key is configured. Rejects with 403 otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(expected) = &state.config.admin.api_key {
            let supplied = parts
                .headers
                .get("x-admin-api-key")
                .and_then(|v| v.to_str().ok());
            if supplied == Some(expected.as_str()) {
                return Ok(RequireAdmin(AuthUser::platform_admin()));
            }
        }

        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_platform_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin access required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
