//! Viewing-request lifecycle engine.
//!
//! Owns the request state machine and tenant-authorization rules, and
//! publishes a marketplace event after every successful write. The event
//! is published only after the row is persisted, so the fan-out never
//! races ahead of the system of record; everything downstream of the bus
//! (room delivery, email) runs on the notification router's task and is
//! invisible to the caller.

use std::sync::Arc;

use keyfront_core::error::CoreError;
use keyfront_core::request::{
    generate_request_id, validate_contact, RequestStatus, TransitionPolicy,
    DEFAULT_REQUEST_TYPE, SOURCE_STOREFRONT, UNASSIGNED_REALTOR,
};
use keyfront_db::models::viewing_request::{NewViewingRequest, RequestFilters, ViewingRequest};
use keyfront_db::repositories::ViewingRequestRepo;
use keyfront_db::DbPool;
use keyfront_events::bus::{REQUEST_CREATED, REQUEST_UPDATED};
use keyfront_events::{EventBus, MarketEvent};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Default page size for request listings.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Hard cap on request listings, preventing unbounded scans.
const MAX_LIST_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Inbound DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /public/agency/{agency_id}/requests`.
///
/// Every field is optional at the serde layer; the engine itself rejects
/// missing contact details so the client gets the domain's 400 message
/// rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRequestPayload {
    pub realtor_id: Option<String>,
    pub listing_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub request_type: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for request listings. `realtorId` is honored for
/// agency admins and platform admins; `agencyId` for platform admins only.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    pub status: Option<String>,
    pub realtor_id: Option<String>,
    pub agency_id: Option<String>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// RequestEngine
// ---------------------------------------------------------------------------

/// Orchestrates viewing-request creation, status changes, and scoped reads.
pub struct RequestEngine {
    pool: DbPool,
    bus: Arc<EventBus>,
    policy: TransitionPolicy,
}

impl RequestEngine {
    pub fn new(pool: DbPool, bus: Arc<EventBus>, policy: TransitionPolicy) -> Self {
        Self { pool, bus, policy }
    }

    /// Create a viewing request for an agency's storefront.
    ///
    /// Validates the contact fields, fills in defaults (generated request
    /// id, unassigned realtor, default request type, storefront source,
    /// `new` status), persists, then publishes `request.created`.
    pub async fn create_request(
        &self,
        agency_id: &str,
        payload: CreateRequestPayload,
    ) -> AppResult<ViewingRequest> {
        let customer_name = payload.customer_name.as_deref().unwrap_or("").trim();
        let customer_phone = payload.customer_phone.as_deref().unwrap_or("").trim();
        validate_contact(customer_name, customer_phone)?;

        let input = NewViewingRequest {
            request_id: generate_request_id(),
            agency_id: agency_id.to_string(),
            realtor_id: non_blank(payload.realtor_id)
                .unwrap_or_else(|| UNASSIGNED_REALTOR.to_string()),
            listing_id: non_blank(payload.listing_id),
            customer_name: customer_name.to_string(),
            customer_phone: customer_phone.to_string(),
            customer_email: non_blank(payload.customer_email),
            request_type: non_blank(payload.request_type)
                .unwrap_or_else(|| DEFAULT_REQUEST_TYPE.to_string()),
            preferred_date: non_blank(payload.preferred_date),
            preferred_time: non_blank(payload.preferred_time),
            notes: non_blank(payload.notes),
            status: RequestStatus::New.as_str().to_string(),
            source: SOURCE_STOREFRONT.to_string(),
        };

        let request = ViewingRequestRepo::insert(&self.pool, &input).await?;
        tracing::info!(
            request_id = %request.request_id,
            agency_id = %request.agency_id,
            realtor_id = %request.realtor_id,
            "Viewing request created"
        );

        self.publish(REQUEST_CREATED, &request);
        Ok(request)
    }

    /// Change a request's status on behalf of an authenticated actor.
    ///
    /// The actor must belong to the request's agency; a `realtor`-role
    /// actor must also be the assigned realtor. An `agency_admin` may
    /// update any request in their agency. Publishes `request.updated`
    /// after the write.
    pub async fn update_status(
        &self,
        actor: &AuthUser,
        request_id: &str,
        new_status: &str,
    ) -> AppResult<ViewingRequest> {
        let target = RequestStatus::parse(new_status)?;

        let existing = ViewingRequestRepo::find_by_request_id(&self.pool, request_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "ViewingRequest",
                id: request_id.to_string(),
            })?;

        if actor.agency_id.as_deref() != Some(existing.agency_id.as_str()) {
            return Err(CoreError::Forbidden("Request is outside your agency".into()).into());
        }
        if actor.is_realtor() && actor.realtor_id.as_deref() != Some(existing.realtor_id.as_str())
        {
            return Err(
                CoreError::Forbidden("Request is assigned to another realtor".into()).into(),
            );
        }

        let current = RequestStatus::parse(&existing.status)?;
        if !self.policy.allows(current, target) {
            return Err(CoreError::Conflict(format!(
                "Cannot change a {current} request to {target}"
            ))
            .into());
        }

        let updated = ViewingRequestRepo::update_status(
            &self.pool,
            request_id,
            &existing.agency_id,
            target.as_str(),
        )
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "ViewingRequest",
            id: request_id.to_string(),
        })?;

        tracing::info!(
            request_id = %updated.request_id,
            status = %updated.status,
            "Viewing request status updated"
        );

        self.publish(REQUEST_UPDATED, &updated);
        Ok(updated)
    }

    /// List requests visible to the actor, newest first.
    ///
    /// Platform admins see everything and may filter by agency/realtor;
    /// agency admins see their whole agency and may filter by realtor;
    /// realtors see only their own requests.
    pub async fn list_requests(
        &self,
        actor: &AuthUser,
        query: &RequestQuery,
    ) -> AppResult<Vec<ViewingRequest>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        let filters = if actor.is_platform_admin() {
            RequestFilters {
                agency_id: query.agency_id.clone(),
                realtor_id: query.realtor_id.clone(),
                status: query.status.clone(),
                limit,
            }
        } else {
            let agency_id = actor
                .agency_id
                .clone()
                .ok_or_else(|| CoreError::Forbidden("Caller has no agency scope".into()))?;
            let realtor_id = if actor.is_agency_admin() {
                query.realtor_id.clone()
            } else {
                actor.realtor_id.clone()
            };
            RequestFilters {
                agency_id: Some(agency_id),
                realtor_id,
                status: query.status.clone(),
                limit,
            }
        };

        Ok(ViewingRequestRepo::list(&self.pool, &filters).await?)
    }

    /// Serialize the row and hand it to the bus. Runs only after a
    /// successful write; failures here are logged, never surfaced.
    fn publish(&self, event_type: &str, request: &ViewingRequest) {
        match serde_json::to_value(request) {
            Ok(payload) => {
                let event = MarketEvent::new(event_type, &request.agency_id)
                    .with_realtor(&request.realtor_id)
                    .with_payload(payload);
                self.bus.publish(event);
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request.request_id,
                    error = %e,
                    "Failed to serialize request event"
                );
            }
        }
    }
}

/// Treat blank strings from the wire as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
