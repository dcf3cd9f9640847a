//! Shared fixtures for the API integration tests.

#![allow(dead_code)]

use api_lib::web::{self, auth::TokenVerifier, state::AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use househeroes_client::operations::Operation;
use househeroes_core::clock::{FixedClock, SharedClock};
use househeroes_core::memory::InMemoryDatabase;
use househeroes_core::seed::seed_database;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-secret";
pub const ISSUER: &str = "https://login.example.com/househeroes/v2.0";
pub const AUDIENCE: &str = "househeroes-mobile";

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDatabase>,
    pub clock: SharedClock,
}

pub async fn app(seeded: bool) -> TestApp {
    let now = Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap();
    let clock: SharedClock = Arc::new(FixedClock(now));
    let db = Arc::new(InMemoryDatabase::new());
    if seeded {
        seed_database(db.as_ref(), &clock).await.unwrap();
    }
    let verifier = TokenVerifier::from_hmac_secret(SECRET, ISSUER, AUDIENCE);
    let state = Arc::new(AppState::new(db.clone(), verifier, clock.clone()));
    TestApp { router: web::router(state), db, clock }
}

pub fn token_for(sub: &str, email: &str, given_name: &str, family_name: &str) -> String {
    let claims = json!({
        "sub": sub,
        "email": email,
        "given_name": given_name,
        "family_name": family_name,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": Utc::now().timestamp() + 3600,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

/// Posts a GraphQL operation and returns the status and decoded body.
pub async fn graphql(
    router: &Router,
    token: Option<&str>,
    query: &str,
    variables: Value,
) -> (StatusCode, Value) {
    post_graphql(router, token, json!({ "query": query, "variables": variables })).await
}

/// Posts one of the client's named operations the way the client sends it.
pub async fn run_operation(
    router: &Router,
    token: Option<&str>,
    operation: &Operation,
    variables: Value,
) -> (StatusCode, Value) {
    let body = json!({
        "query": operation.document,
        "operationName": operation.name,
        "variables": variables,
    });
    post_graphql(router, token, body).await
}

async fn post_graphql(router: &Router, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = router
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}
