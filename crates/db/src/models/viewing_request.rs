//! Viewing-request entity model and DTOs.

use keyfront_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `viewing_requests` table.
///
/// `Deserialize` is derived as well because the row travels through event
/// payloads between the lifecycle engine and the notification router.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ViewingRequest {
    pub id: DbId,
    pub request_id: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub listing_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub request_type: String,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub source: String,
    pub created_at: Timestamp,
}

/// Insert DTO for a new viewing request. All defaulting (request id,
/// unassigned realtor, request type, source) happens before this struct
/// is built; the repository writes it verbatim.
#[derive(Debug, Clone)]
pub struct NewViewingRequest {
    pub request_id: String,
    pub agency_id: String,
    pub realtor_id: String,
    pub listing_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub request_type: String,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub source: String,
}

/// Tenant-scoped listing filters. `agency_id` and `realtor_id` here are
/// *additional* predicates supplied by the caller on top of the scope the
/// repository method itself enforces.
#[derive(Debug, Clone, Default)]
pub struct RequestFilters {
    pub agency_id: Option<String>,
    pub realtor_id: Option<String>,
    pub status: Option<String>,
    pub limit: i64,
}
