use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use keyfront_core::error::CoreError;
use keyfront_core::rooms::rooms_for;
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::AppResult;
use crate::state::AppState;
use crate::ws::manager::{RoomHub, SessionContext};

/// Handshake query parameters. Browsers cannot set headers on a WebSocket
/// upgrade, so the bearer token travels as a query parameter.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// HTTP handler that authenticates the handshake and upgrades the
/// connection to WebSocket.
///
/// The connection is refused with 401 before the upgrade when the token is
/// missing or invalid. On success the session's room memberships are
/// computed from the token claims and the connection is registered with
/// [`RoomHub`].
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let token = query
        .token
        .ok_or_else(|| CoreError::Unauthorized("Authentication required".into()))?;

    let claims = validate_token(&token, &state.config.jwt)
        .map_err(|_| CoreError::Unauthorized("Invalid token".into()))?;

    let session = SessionContext {
        role: claims.role,
        agency_id: claims.agency_id,
        realtor_id: claims.realtor_id,
    };
    let rooms = rooms_for(
        &session.role,
        session.agency_id.as_deref(),
        session.realtor_id.as_deref(),
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.hub, session, rooms)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection and its rooms with `RoomHub`.
///   2. Spawns a sender task that forwards messages from the hub channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(
    socket: WebSocket,
    hub: Arc<RoomHub>,
    session: SessionContext,
    rooms: Vec<String>,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        conn_id = %conn_id,
        role = %session.role,
        agency_id = ?session.agency_id,
        realtor_id = ?session.realtor_id,
        rooms = ?rooms,
        "WebSocket connected"
    );

    // Register and get the receiver for outbound messages.
    let mut rx = hub.add(conn_id.clone(), session, rooms).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: clients only listen on this channel, so inbound
    // traffic is limited to control frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    hub.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
