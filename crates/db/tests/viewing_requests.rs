//! Database-level tests for the viewing-request repository: insert/lookup
//! round trips, tenant-scoped updates, and last-write-wins semantics.

use keyfront_db::models::viewing_request::{NewViewingRequest, RequestFilters};
use keyfront_db::repositories::ViewingRequestRepo;
use sqlx::PgPool;

fn new_request(request_id: &str, agency_id: &str, realtor_id: &str) -> NewViewingRequest {
    NewViewingRequest {
        request_id: request_id.to_string(),
        agency_id: agency_id.to_string(),
        realtor_id: realtor_id.to_string(),
        listing_id: None,
        customer_name: "Jane Doe".to_string(),
        customer_phone: "8765551234".to_string(),
        customer_email: None,
        request_type: "walk_in".to_string(),
        preferred_date: None,
        preferred_time: None,
        notes: None,
        status: "new".to_string(),
        source: "storefront".to_string(),
    }
}

#[sqlx::test]
async fn insert_and_find_round_trip(pool: PgPool) {
    let input = new_request("REQ-abc123", "A1", "R100");
    let inserted = ViewingRequestRepo::insert(&pool, &input)
        .await
        .expect("insert should succeed");

    assert_eq!(inserted.request_id, "REQ-abc123");
    assert_eq!(inserted.status, "new");
    assert_eq!(inserted.source, "storefront");

    let found = ViewingRequestRepo::find_by_request_id(&pool, "REQ-abc123")
        .await
        .expect("lookup should succeed")
        .expect("row should exist");
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.customer_name, "Jane Doe");
}

#[sqlx::test]
async fn duplicate_request_id_is_rejected(pool: PgPool) {
    let input = new_request("REQ-dup", "A1", "R100");
    ViewingRequestRepo::insert(&pool, &input)
        .await
        .expect("first insert should succeed");

    let err = ViewingRequestRepo::insert(&pool, &input)
        .await
        .expect_err("second insert must violate the unique constraint");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected a database error, got: {other:?}"),
    }
}

#[sqlx::test]
async fn update_status_is_scoped_by_agency(pool: PgPool) {
    let input = new_request("REQ-scope", "A1", "R100");
    ViewingRequestRepo::insert(&pool, &input)
        .await
        .expect("insert should succeed");

    // Wrong agency: the scoped filter matches nothing.
    let miss = ViewingRequestRepo::update_status(&pool, "REQ-scope", "A2", "contacted")
        .await
        .expect("update should not error");
    assert!(miss.is_none());

    // Correct agency: the row is updated and returned.
    let hit = ViewingRequestRepo::update_status(&pool, "REQ-scope", "A1", "contacted")
        .await
        .expect("update should not error")
        .expect("scoped update should match");
    assert_eq!(hit.status, "contacted");
}

#[sqlx::test]
async fn list_applies_tenant_predicates_and_limit(pool: PgPool) {
    for (id, agency, realtor, status) in [
        ("REQ-1", "A1", "R100", "new"),
        ("REQ-2", "A1", "R100", "booked"),
        ("REQ-3", "A1", "R200", "new"),
        ("REQ-4", "A2", "R300", "new"),
    ] {
        let mut input = new_request(id, agency, realtor);
        input.status = status.to_string();
        ViewingRequestRepo::insert(&pool, &input)
            .await
            .expect("insert should succeed");
    }

    let agency_wide = ViewingRequestRepo::list(
        &pool,
        &RequestFilters {
            agency_id: Some("A1".to_string()),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .expect("list should succeed");
    assert_eq!(agency_wide.len(), 3);

    let one_realtor = ViewingRequestRepo::list(
        &pool,
        &RequestFilters {
            agency_id: Some("A1".to_string()),
            realtor_id: Some("R100".to_string()),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .expect("list should succeed");
    assert_eq!(one_realtor.len(), 2);

    let by_status = ViewingRequestRepo::list(
        &pool,
        &RequestFilters {
            agency_id: Some("A1".to_string()),
            status: Some("booked".to_string()),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .expect("list should succeed");
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].request_id, "REQ-2");

    let capped = ViewingRequestRepo::list(
        &pool,
        &RequestFilters {
            agency_id: Some("A1".to_string()),
            limit: 2,
            ..Default::default()
        },
    )
    .await
    .expect("list should succeed");
    assert_eq!(capped.len(), 2);
}

#[sqlx::test]
async fn concurrent_status_updates_are_last_write_wins(pool: PgPool) {
    let input = new_request("REQ-race", "A1", "R100");
    ViewingRequestRepo::insert(&pool, &input)
        .await
        .expect("insert should succeed");

    let (a, b) = tokio::join!(
        ViewingRequestRepo::update_status(&pool, "REQ-race", "A1", "booked"),
        ViewingRequestRepo::update_status(&pool, "REQ-race", "A1", "closed"),
    );
    a.expect("first update should not error");
    b.expect("second update should not error");

    let final_row = ViewingRequestRepo::find_by_request_id(&pool, "REQ-race")
        .await
        .expect("lookup should succeed")
        .expect("row should exist");
    assert!(
        final_row.status == "booked" || final_row.status == "closed",
        "final status must be one of the two writes, got: {}",
        final_row.status
    );

    let count = ViewingRequestRepo::count_for_agency(&pool, "A1")
        .await
        .expect("count should succeed");
    assert_eq!(count, 1, "racing updates must not duplicate rows");
}
