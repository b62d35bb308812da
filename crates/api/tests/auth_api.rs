//! HTTP-level integration tests for portal and admin authentication and
//! role enforcement.

mod common;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::body::Body;
use common::{body_json, get, get_auth, post_json};
use keyfront_core::roles::ROLE_REALTOR;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Portal login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn portal_login_succeeds_with_each_identifier_kind(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool.clone());
    common::create_profile(&pool, ROLE_REALTOR, "A1", "R100", Some("r100@agency.test")).await;

    for identifier in ["A1", "R100", "r100@agency.test"] {
        let response = post_json(
            app.clone(),
            "/api/v1/realtor/login",
            json!({ "identifier": identifier, "password": common::TEST_PASSWORD }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "identifier: {identifier}");
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert!(json["token"].is_string());
        assert_eq!(json["profile"]["realtor_id"], "R100");
        assert!(
            json["profile"].get("password_hash").is_none(),
            "the password hash must never be serialized"
        );
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn portal_login_rejects_wrong_password(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool.clone());
    common::create_profile(&pool, ROLE_REALTOR, "A1", "R100", None).await;

    let response = post_json(
        app,
        "/api/v1/realtor/login",
        json!({ "identifier": "R100", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn portal_login_rejects_unknown_identifier(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/realtor/login",
        json!({ "identifier": "nobody", "password": "whatever" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_token_authenticates_me_endpoint(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool.clone());
    common::create_profile(&pool, ROLE_REALTOR, "A1", "R100", None).await;

    let response = post_json(
        app.clone(),
        "/api/v1/realtor/login",
        json!({ "identifier": "R100", "password": common::TEST_PASSWORD }),
    )
    .await;
    let token = body_json(response).await["token"]
        .as_str()
        .expect("login should return a token")
        .to_string();

    let response = get_auth(app, "/api/v1/realtor/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["profile"]["agency_id"], "A1");
}

// ---------------------------------------------------------------------------
// Token enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn protected_endpoints_reject_missing_and_garbage_tokens(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/realtor/requests").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/realtor/requests", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn realtor_token_cannot_reach_admin_endpoints(pool: PgPool) {
    let (app, state) = common::build_test_app(pool.clone());
    let realtor = common::create_profile(&pool, ROLE_REALTOR, "A1", "R100", None).await;
    let token = common::token_for(&state, &realtor);

    let response = get_auth(app, "/api/v1/admin/requests", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Admin authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_issues_usable_token(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/admin/login",
        json!({ "username": "root", "password": "admin_password_123!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .expect("admin login should return a token")
        .to_string();

    let response = get_auth(app, "/api/v1/admin/requests", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_accepts_the_configured_email(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/admin/login",
        json!({ "username": "root@keyfront.app", "password": "admin_password_123!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_rejects_bad_credentials(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/admin/login",
        json!({ "username": "root", "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/admin/login",
        json!({ "username": "someone-else", "password": "admin_password_123!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_api_key_header_bypasses_bearer_auth(pool: PgPool) {
    let (app, _state) = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/admin/requests")
        .header("x-admin-api-key", "test-admin-api-key")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A wrong key falls through to bearer auth and fails.
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/admin/requests")
        .header("x-admin-api-key", "wrong-key")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin profile management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_can_create_profile_and_the_profile_can_log_in(pool: PgPool) {
    let (app, state) = common::build_test_app(pool);
    let token = common::admin_token(&state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/agencies")
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({
                "agency_id": "A9",
                "realtor_id": "R900",
                "profile_email": "r900@agency.test",
                "password": "fresh_password_1",
                "display_name": "New Agency",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["profile"]["role"], "agency_admin");
    assert_eq!(json["profile"]["branding_tier"], "starter");

    let response = post_json(
        app,
        "/api/v1/realtor/login",
        json!({ "identifier": "R900", "password": "fresh_password_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_password_reset_takes_effect(pool: PgPool) {
    let (app, state) = common::build_test_app(pool.clone());
    common::create_profile(&pool, ROLE_REALTOR, "A1", "R100", None).await;
    let token = common::admin_token(&state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/reset-password")
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({
                "agency_id": "A1",
                "realtor_id": "R100",
                "password": "rotated_password_1",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["updated"], 1);

    // The old password no longer works; the new one does.
    let response = post_json(
        app.clone(),
        "/api/v1/realtor/login",
        json!({ "identifier": "R100", "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/realtor/login",
        json!({ "identifier": "R100", "password": "rotated_password_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
