//! Tests for the plain HTTP endpoints served next to GraphQL.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::app;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app(false).await;
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Healthy");
}

#[tokio::test]
async fn api_tasks_lists_tasks_with_relationships() {
    let app = app(true).await;
    let (status, body) = get(&app.router, "/api/tasks").await;
    assert_eq!(status, StatusCode::OK);

    let tasks: Value = serde_json::from_slice(&body).unwrap();
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 11);
    let trash = tasks.iter().find(|t| t["title"] == "Take out trash").unwrap();
    assert_eq!(trash["family"]["name"], "The Paquin Family");
    assert_eq!(trash["createdBy"]["email"], "sarah.paquin@email.com");
    assert!(trash["assignees"].is_array());
}

#[tokio::test]
async fn api_tasks_is_empty_without_data() {
    let app = app(false).await;
    let (status, body) = get(&app.router, "/api/tasks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn graphiql_is_served_on_get() {
    let app = app(false).await;
    let (status, body) = get(&app.router, "/graphql").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("graphiql"));
}
