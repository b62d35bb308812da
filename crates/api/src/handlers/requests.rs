//! Handlers for the realtor portal's `/realtor/requests` resource.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use keyfront_core::error::CoreError;
use serde::Deserialize;

use crate::engine::RequestQuery;
use crate::error::AppResult;
use crate::middleware::rbac::RequireRealtor;
use crate::response::ok_with;
use crate::state::AppState;

/// Body of `POST /realtor/requests/{request_id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

/// GET /api/v1/realtor/requests
///
/// Requests visible to the caller: their own for `realtor`, the whole
/// agency for `agency_admin`. Optional `status` filter and capped `limit`.
pub async fn list_requests(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = state.engine.list_requests(&user, &query).await?;
    Ok(ok_with("requests", requests))
}

/// POST /api/v1/realtor/requests/{request_id}/status
///
/// Move a request through its lifecycle. 400 on an unknown status, 403
/// out of tenant scope, 404 for an unknown id.
pub async fn update_status(
    RequireRealtor(user): RequireRealtor,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> AppResult<impl IntoResponse> {
    let status = body
        .status
        .ok_or_else(|| CoreError::Validation("status required".into()))?;
    let request = state
        .engine
        .update_status(&user, &request_id, &status)
        .await?;
    Ok(ok_with("request", request))
}
