//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the marketplace event bus and turns
//! each event into room fan-out frames and, where a recipient can be
//! resolved, an email. It runs on its own task: the request/response path
//! publishes to the bus and never waits for delivery. Every failure on
//! this side of the bus is logged and swallowed.

use std::sync::Arc;

use keyfront_core::request::UNASSIGNED_REALTOR;
use keyfront_core::rooms::{agency_room, realtor_room, ADMIN_ROOM};
use keyfront_db::models::listing::Listing;
use keyfront_db::models::viewing_request::ViewingRequest;
use keyfront_db::repositories::ProfileRepo;
use keyfront_db::DbPool;
use keyfront_events::bus::{LISTING_UPDATED, REQUEST_CREATED, REQUEST_UPDATED};
use keyfront_events::{DeliveryOutcome, Mailer, MarketEvent};
use serde_json::json;
use tokio::sync::broadcast;

use crate::ws::RoomHub;

/// Wire event name for a new request reaching its assigned realtor.
const WS_NEW_REQUEST: &str = "new_request";
/// Wire event name for a new request reaching the owning agency.
const WS_AGENCY_REQUEST: &str = "agency_request";
/// Wire event name for a new request reaching platform admins.
const WS_ADMIN_REQUEST: &str = "admin_request";
/// Wire event name for a request status change.
const WS_REQUEST_UPDATE: &str = "request_update";
/// Wire event name for a listing change.
const WS_LISTING_UPDATE: &str = "listing_update";

/// Routes marketplace events to hub rooms and email recipients.
pub struct NotificationRouter {
    pool: DbPool,
    hub: Arc<RoomHub>,
    mailer: Arc<Mailer>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool, room hub, and mailer.
    pub fn new(pool: DbPool, hub: Arc<RoomHub>, mailer: Arc<Mailer>) -> Self {
        Self { pool, hub, mailer }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](keyfront_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<MarketEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event. Infallible by design: each branch logs its
    /// own failures and moves on.
    async fn route_event(&self, event: &MarketEvent) {
        match event.event_type.as_str() {
            REQUEST_CREATED => self.on_request_created(event).await,
            REQUEST_UPDATED => self.on_request_updated(event).await,
            LISTING_UPDATED => self.on_listing_updated(event).await,
            other => {
                tracing::debug!(event_type = other, "No notification route for event");
            }
        }
    }

    /// Fan a new request out to the realtor, agency, and admin rooms, then
    /// email the assigned realtor.
    async fn on_request_created(&self, event: &MarketEvent) {
        let Some(request) = decode_request(event) else { return };

        // The realtor-room publish fires even for unassigned requests;
        // the sentinel's room simply has no members.
        self.hub
            .publish(
                &realtor_room(&request.realtor_id),
                &json!({
                    "event": WS_NEW_REQUEST,
                    "type": "new_request",
                    "request": request,
                    "message": format!("New viewing request from {}", request.customer_name),
                }),
            )
            .await;

        self.hub
            .publish(
                &agency_room(&request.agency_id),
                &json!({
                    "event": WS_AGENCY_REQUEST,
                    "type": "new_request",
                    "request": request,
                }),
            )
            .await;

        self.hub
            .publish(
                ADMIN_ROOM,
                &json!({
                    "event": WS_ADMIN_REQUEST,
                    "type": "new_request",
                    "request": request,
                }),
            )
            .await;

        if request.realtor_id != UNASSIGNED_REALTOR {
            match ProfileRepo::find_email(&self.pool, &request.agency_id, &request.realtor_id)
                .await
            {
                Ok(Some(email)) => {
                    let outcome = self.mailer.notify_new_request(event, &email).await;
                    log_outcome(&request.request_id, "new_request", &outcome);
                }
                Ok(None) => {
                    tracing::debug!(
                        request_id = %request.request_id,
                        realtor_id = %request.realtor_id,
                        "Assigned realtor has no notification email"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        request_id = %request.request_id,
                        error = %e,
                        "Failed to resolve realtor email"
                    );
                }
            }
        }
    }

    /// Push a status change to the realtor's room and email the customer
    /// when they left an address.
    async fn on_request_updated(&self, event: &MarketEvent) {
        let Some(request) = decode_request(event) else { return };

        self.hub
            .publish(
                &realtor_room(&request.realtor_id),
                &json!({
                    "event": WS_REQUEST_UPDATE,
                    "type": "request_update",
                    "request": request,
                    "message": format!(
                        "Request {} updated to {}",
                        request.request_id, request.status
                    ),
                }),
            )
            .await;

        if let Some(customer_email) = &request.customer_email {
            let outcome = self.mailer.notify_status_change(event, customer_email).await;
            log_outcome(&request.request_id, "status_change", &outcome);
        }
    }

    /// Push a listing change to the owning agency's room.
    async fn on_listing_updated(&self, event: &MarketEvent) {
        let listing = event.payload.get("listing").cloned().unwrap_or_default();
        let Ok(listing) = serde_json::from_value::<Listing>(listing) else {
            tracing::warn!(event_type = %event.event_type, "Malformed listing event payload");
            return;
        };
        let action = event
            .payload
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("updated");

        self.hub
            .publish(
                &agency_room(&listing.agency_id),
                &json!({
                    "event": WS_LISTING_UPDATE,
                    "type": "listing_update",
                    "listing": listing,
                    "action": action,
                    "message": format!("Listing {} {}", listing.listing_id, action),
                }),
            )
            .await;
    }
}

/// Decode the request row carried in an event payload.
fn decode_request(event: &MarketEvent) -> Option<ViewingRequest> {
    match serde_json::from_value::<ViewingRequest>(event.payload.clone()) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::warn!(
                event_type = %event.event_type,
                error = %e,
                "Malformed request event payload"
            );
            None
        }
    }
}

fn log_outcome(request_id: &str, kind: &str, outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Sent => {
            tracing::info!(request_id, kind, "Notification email sent");
        }
        DeliveryOutcome::Skipped(reason) => {
            tracing::debug!(request_id, kind, reason = %reason, "Notification email skipped");
        }
        DeliveryOutcome::Failed(reason) => {
            tracing::warn!(request_id, kind, reason = %reason, "Notification email failed");
        }
    }
}
