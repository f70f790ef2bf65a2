#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header, http::StatusCode, test};
use serde_json::{json, Value};
use std::time::Duration;
use todoforge::auth::{AuthResponse, PasswordHasher, TokenService};
use todoforge::AppState;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// In-memory state with the cheapest bcrypt cost.
pub fn memory_state() -> AppState {
    memory_state_with_ttl(Duration::from_secs(24 * 60 * 60))
}

pub fn memory_state_with_ttl(ttl: Duration) -> AppState {
    AppState::in_memory(TokenService::new(TEST_SECRET, ttl), PasswordHasher::new(4))
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Registers `email` and logs in, returning the login response.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> AuthResponse {
    let (status, body) = register(app, email, password).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "login failed");
    test::read_body_json(resp).await
}
