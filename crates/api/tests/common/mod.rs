#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use keyfront_api::auth::jwt::{generate_access_token, JwtConfig};
use keyfront_api::auth::password::hash_password;
use keyfront_api::config::{AdminConfig, ServerConfig};
use keyfront_api::engine::RequestEngine;
use keyfront_api::notifications::NotificationRouter;
use keyfront_api::routes;
use keyfront_api::state::AppState;
use keyfront_api::ws::RoomHub;
use keyfront_core::request::TransitionPolicy;
use keyfront_core::roles::ROLE_PLATFORM_ADMIN;
use keyfront_db::models::profile::{NewProfile, Profile};
use keyfront_db::repositories::ProfileRepo;
use keyfront_events::{EventBus, Mailer};

/// Password used for every test profile.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 480,
        },
        admin: AdminConfig {
            username: "root".to_string(),
            email: Some("root@keyfront.app".to_string()),
            password: "admin_password_123!".to_string(),
            api_key: Some("test-admin-api-key".to_string()),
        },
        transition_policy: TransitionPolicy::Lenient,
    }
}

/// Build the full application router plus its state, using the given
/// database pool and transition policy.
///
/// This mirrors the router construction in `main.rs` (same middleware
/// stack, a running notification router, a disabled mailer) so tests
/// exercise the production wiring end to end.
pub fn build_test_app_with(pool: PgPool, policy: TransitionPolicy) -> (Router, AppState) {
    let mut config = test_config();
    config.transition_policy = policy;

    let hub = Arc::new(RoomHub::new());
    let event_bus = Arc::new(EventBus::default());
    let mailer = Arc::new(Mailer::disabled());

    let notification_router =
        NotificationRouter::new(pool.clone(), Arc::clone(&hub), Arc::clone(&mailer));
    tokio::spawn(notification_router.run(event_bus.subscribe()));

    let engine = Arc::new(RequestEngine::new(
        pool.clone(),
        Arc::clone(&event_bus),
        policy,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config),
        hub,
        event_bus,
        engine,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state.clone());

    (app, state)
}

/// Build the app with the default lenient transition policy.
pub fn build_test_app(pool: PgPool) -> (Router, AppState) {
    build_test_app_with(pool, TransitionPolicy::Lenient)
}

/// Create a test profile directly in the database.
pub async fn create_profile(
    pool: &PgPool,
    role: &str,
    agency_id: &str,
    realtor_id: &str,
    email: Option<&str>,
) -> Profile {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let input = NewProfile {
        role: role.to_string(),
        agency_id: agency_id.to_string(),
        realtor_id: realtor_id.to_string(),
        profile_email: email.map(str::to_string),
        password_hash,
        display_name: Some(format!("{realtor_id} Test")),
        phone: Some("8765550000".to_string()),
        whatsapp: None,
        branding_tier: "starter".to_string(),
    };
    ProfileRepo::insert(pool, &input)
        .await
        .expect("profile creation should succeed")
}

/// Mint an access token for a profile using the test JWT secret.
pub fn token_for(state: &AppState, profile: &Profile) -> String {
    generate_access_token(
        profile.id,
        &profile.role,
        Some(&profile.agency_id),
        Some(&profile.realtor_id),
        &state.config.jwt,
    )
    .expect("token generation should succeed")
}

/// Mint a platform-admin token using the test JWT secret.
pub fn admin_token(state: &AppState) -> String {
    generate_access_token(0, ROLE_PLATFORM_ADMIN, None, None, &state.config.jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
