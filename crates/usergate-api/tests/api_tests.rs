//! API Integration Tests
//!
//! Drive the full router over the in-memory credential store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;
use usergate_api::{create_router, create_router_for_testing, testing};
use usergate_core::AppConfig;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

fn with_auth(method: &str, uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

fn signup_payload(email: &str, password: &str) -> Value {
    json!({
        "name": "Ada",
        "email": email,
        "phone": "555-0100",
        "password": password
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["auth_cache"]["entries"].is_number());
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/users/signup"].is_object());
    assert!(json["paths"]["/users/signin"].is_object());
}

// =============================================================================
// Account Flow Tests
// =============================================================================

#[tokio::test]
async fn test_signup_signin_and_token_reuse() {
    let (state, store) = testing::test_state();
    let app = create_router(state);

    // Sign up
    let (status, user) = send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(user["id"].is_string());
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["role"], "DEV");
    assert!(user.get("password").is_none());

    let stored = store.raw("a@x.com").await.unwrap();
    assert!(!stored.password.is_empty());
    assert_ne!(stored.password, "p1");

    // Sign in with the right password
    let (status, signin) = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("a@x.com", "p1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signin["name"], "Ada");
    let token = signin["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // Wrong password
    let (status, denied) = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("a@x.com", "p2")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(denied.get("token").is_none());

    // Token reused on a protected route
    let (status, me) = send(
        &app,
        with_auth("GET", "/users/me", &format!("Bearer {token}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");
    assert_eq!(me["id"], user["id"]);
    assert_eq!(me["roles"], json!(["DEV"]));
}

#[tokio::test]
async fn test_signin_with_lowercase_basic_scheme() {
    let app = create_router_for_testing();
    send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;

    let lowercase = format!("basic {}", STANDARD.encode("a@x.com:p1"));
    let (status, signin) = send(&app, with_auth("POST", "/users/signin", &lowercase)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!signin["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_signin_with_bearer_reissues_token() {
    let app = create_router_for_testing();
    send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;

    let (_, first) = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("a@x.com", "p1")),
    )
    .await;
    let first = first["token"].as_str().unwrap().to_string();

    let (status, second) = send(
        &app,
        with_auth("POST", "/users/signin", &format!("Bearer {first}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["name"], "Ada");
    let second = second["token"].as_str().unwrap().to_string();
    assert!(!second.is_empty());
    assert_ne!(second, first);

    let (status, me) = send(
        &app,
        with_auth("GET", "/users/me", &format!("Bearer {second}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");
}

#[tokio::test]
async fn test_signup_accepts_whatsapp_alias() {
    let app = create_router_for_testing();

    let (status, user) = send(
        &app,
        create_json_request(
            "POST",
            "/users/signup",
            Some(json!({
                "name": "Ada",
                "email": "a@x.com",
                "whatsapp": "555-0100",
                "password": "p1"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["phone"], "555-0100");
}

#[tokio::test]
async fn test_signup_bypasses_gateway_regardless_of_credentials() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/users/signup")
        .header("Content-Type", "application/json")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::from(signup_payload("a@x.com", "p1").to_string()))
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_invalid_payload() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/users/signup",
            Some(json!({"name": "Ada", "email": "not-an-email", "phone": "1", "password": "p1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "invalid");

    let request = Request::builder()
        .method("POST")
        .uri("/users/signup")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p2"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "on save");
}

// =============================================================================
// Gateway Tests
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_credentials() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/users/me")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    // Sign-up is whitelisted for POST only
    let (status, _) = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/users/signup")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let app = create_router_for_testing();
    send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;

    let wrong_password = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("a@x.com", "nope")),
    )
    .await;
    let unknown_user = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("b@x.com", "p1")),
    )
    .await;
    let bad_token = send(&app, with_auth("GET", "/users/me", "Bearer abc.def.ghi")).await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password, bad_token);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let mut config = AppConfig::default();
    config.auth.token_expiry_secs = 1;
    let (state, _) = testing::test_state_with(config);
    let app = create_router(state);
    send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;

    let (_, signin) = send(
        &app,
        with_auth("POST", "/users/signin", &basic_auth("a@x.com", "p1")),
    )
    .await;
    let bearer = format!("Bearer {}", signin["token"].as_str().unwrap());

    let (status, _) = send(&app, with_auth("GET", "/users/me", &bearer)).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    let expired = send(&app, with_auth("GET", "/users/me", &bearer)).await;
    let missing = send(
        &app,
        Request::builder()
            .uri("/users/me")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.1["code"], "UNAUTHORIZED");
    assert_eq!(expired, missing);
}

#[tokio::test]
async fn test_repeated_basic_auth_is_served_from_cache() {
    let (state, store) = testing::test_state();
    let app = create_router(state.clone());
    send(
        &app,
        create_json_request("POST", "/users/signup", Some(signup_payload("a@x.com", "p1"))),
    )
    .await;

    for _ in 0..3 {
        let (status, me) = send(
            &app,
            with_auth("GET", "/users/me", &basic_auth("a@x.com", "p1")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "a@x.com");
    }

    assert_eq!(store.lookup_count(), 1);
    assert_eq!(state.cache.stats().hits(), 2);
}

#[tokio::test]
async fn test_cors_preflight_skips_gateway() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/users/signin")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
