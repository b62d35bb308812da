//! Unit tests for `RoomHub`.
//!
//! These tests exercise the tenant-scoped fan-out hub directly, without
//! performing any HTTP upgrades. They verify add/remove semantics,
//! room-scoped delivery, and graceful shutdown behaviour.

use axum::extract::ws::Message;
use keyfront_api::ws::{RoomHub, SessionContext};
use serde_json::json;

fn realtor_session(agency_id: &str, realtor_id: &str) -> SessionContext {
    SessionContext {
        role: "realtor".to_string(),
        agency_id: Some(agency_id.to_string()),
        realtor_id: Some(realtor_id.to_string()),
    }
}

fn admin_session() -> SessionContext {
    SessionContext {
        role: "platform_admin".to_string(),
        agency_id: None,
        realtor_id: None,
    }
}

fn text_of(msg: &Message) -> &str {
    match msg {
        Message::Text(text) => text.as_str(),
        other => panic!("expected a Text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_hub_has_zero_connections() {
    let hub = RoomHub::new();

    assert_eq!(hub.connection_count().await, 0);
    assert_eq!(hub.room_member_count("agency:A1").await, 0);
}

#[tokio::test]
async fn add_and_remove_track_membership() {
    let hub = RoomHub::new();

    let _rx = hub
        .add(
            "conn-1".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string(), "realtor:R100".to_string()],
        )
        .await;

    assert_eq!(hub.connection_count().await, 1);
    assert_eq!(hub.room_member_count("agency:A1").await, 1);
    assert_eq!(hub.room_member_count("realtor:R100").await, 1);

    hub.remove("conn-1").await;
    assert_eq!(hub.connection_count().await, 0);
    assert_eq!(hub.room_member_count("agency:A1").await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let hub = RoomHub::new();

    let _rx = hub
        .add(
            "conn-1".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string()],
        )
        .await;
    hub.remove("nonexistent").await;

    assert_eq!(hub.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_only_room_members() {
    let hub = RoomHub::new();

    let mut rx_a = hub
        .add(
            "conn-a".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string(), "realtor:R100".to_string()],
        )
        .await;
    let mut rx_b = hub
        .add(
            "conn-b".to_string(),
            realtor_session("A1", "R200"),
            vec!["agency:A1".to_string(), "realtor:R200".to_string()],
        )
        .await;

    let delivered = hub
        .publish("realtor:R100", &json!({"event": "new_request"}))
        .await;
    assert_eq!(delivered, 1);

    let msg = rx_a.recv().await.expect("R100 should receive the frame");
    assert!(text_of(&msg).contains("new_request"));

    // R200's personal room was not addressed; its channel must stay empty.
    assert!(
        rx_b.try_recv().is_err(),
        "R200 must not receive a frame addressed to realtor:R100"
    );

    // The shared agency room reaches both.
    let delivered = hub
        .publish("agency:A1", &json!({"event": "agency_request"}))
        .await;
    assert_eq!(delivered, 2);
}

#[tokio::test]
async fn publish_to_empty_room_is_a_noop() {
    let hub = RoomHub::new();

    // No members anywhere: must not error, block, or deliver.
    let delivered = hub
        .publish("realtor:NOBODY", &json!({"event": "new_request"}))
        .await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn publish_skips_closed_channels() {
    let hub = RoomHub::new();

    let rx_gone = hub
        .add(
            "conn-gone".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string()],
        )
        .await;
    let mut rx_live = hub
        .add(
            "conn-live".to_string(),
            realtor_session("A1", "R200"),
            vec!["agency:A1".to_string()],
        )
        .await;

    // Drop one receiver to close its channel.
    drop(rx_gone);

    let delivered = hub.publish("agency:A1", &json!({"event": "ping"})).await;
    assert_eq!(delivered, 1, "closed channel must be skipped silently");

    let msg = rx_live.recv().await.expect("live connection should receive");
    assert!(text_of(&msg).contains("ping"));
}

#[tokio::test]
async fn admin_room_is_isolated_from_tenant_rooms() {
    let hub = RoomHub::new();

    let mut rx_admin = hub
        .add(
            "conn-admin".to_string(),
            admin_session(),
            vec!["admin".to_string()],
        )
        .await;
    let mut rx_realtor = hub
        .add(
            "conn-realtor".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string(), "realtor:R100".to_string()],
        )
        .await;

    hub.publish("admin", &json!({"event": "admin_request"})).await;

    let msg = rx_admin.recv().await.expect("admin should receive");
    assert!(text_of(&msg).contains("admin_request"));
    assert!(rx_realtor.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let hub = RoomHub::new();

    let mut rx1 = hub
        .add(
            "conn-1".to_string(),
            realtor_session("A1", "R100"),
            vec!["agency:A1".to_string()],
        )
        .await;
    let mut rx2 = hub
        .add(
            "conn-2".to_string(),
            realtor_session("A1", "R200"),
            vec!["agency:A1".to_string()],
        )
        .await;
    assert_eq!(hub.connection_count().await, 2);

    hub.shutdown_all().await;

    assert_eq!(hub.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)));
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)));

    // After Close, the channel should be closed (no more messages).
    assert!(rx1.recv().await.is_none());
}

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let hub = RoomHub::new();

    let _rx_old = hub
        .add(
            "conn-1".to_string(),
            realtor_session("A1", "R100"),
            vec!["realtor:R100".to_string()],
        )
        .await;
    assert_eq!(hub.connection_count().await, 1);

    // Re-add with the same ID -- should replace, not duplicate.
    let mut rx_new = hub
        .add(
            "conn-1".to_string(),
            realtor_session("A1", "R100"),
            vec!["realtor:R100".to_string()],
        )
        .await;
    assert_eq!(hub.connection_count().await, 1);

    hub.publish("realtor:R100", &json!({"event": "replaced"}))
        .await;
    let msg = rx_new.recv().await.expect("new rx should receive");
    assert!(text_of(&msg).contains("replaced"));
}
