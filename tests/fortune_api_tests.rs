// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fortune history API tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fortune_admin::identity::Principal;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_string, create_test_app, fields, session_cookie};

fn list_request(principal: Option<&Principal>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/fortunes");
    if let Some(principal) = principal {
        builder = builder.header(header::COOKIE, session_cookie(principal));
    }
    builder.body(Body::empty()).unwrap()
}

fn add_request(principal: Option<&Principal>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/fortunes")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(principal) = principal {
        builder = builder.header(header::COOKIE, session_cookie(principal));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_signed_out_list_is_empty() {
    let (app, _, store) = create_test_app();
    store.seed(
        "fortunes",
        "f1",
        fields(json!({"userId": "u1", "type": "tarot", "result": "The sun"})),
    );

    let response = app.oneshot(list_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_list_returns_only_own_fortunes() {
    let (app, _, store) = create_test_app();
    store.seed(
        "fortunes",
        "f1",
        fields(json!({"userId": "u1", "type": "tarot", "result": "The sun"})),
    );
    store.seed(
        "fortunes",
        "f2",
        fields(json!({"userId": "u2", "type": "tarot", "result": "The moon"})),
    );

    let principal = Principal::new("u2", "two@example.com");
    let response = app.oneshot(list_request(Some(&principal))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([{"userId": "u2", "type": "tarot", "result": "The moon"}])
    );
}

#[tokio::test]
async fn test_signed_out_add_is_a_no_op() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(add_request(None, json!({"type": "tarot", "result": "The tower"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"stored": false}));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_add_stores_one_record_for_principal() {
    let (app, _, store) = create_test_app();
    let principal = Principal::new("u9", "nine@example.com");

    let response = app
        .oneshot(add_request(
            Some(&principal),
            json!({"type": "tarot", "result": "The tower"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["stored"], json!(true));

    let key = body["key"].as_str().unwrap();
    let doc = store.document("fortunes", key).unwrap();
    assert_eq!(doc.fields["userId"], json!("u9"));
    assert_eq!(doc.fields["type"], json!("tarot"));
    assert_eq!(doc.fields["result"], json!("The tower"));
    assert!(doc.fields["timestamp"].is_string());
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test]
async fn test_backend_failure_is_reported() {
    let (app, _, store) = create_test_app();
    store.set_unavailable(true);

    let response = app
        .oneshot(add_request(
            Some(&Principal::new("u1", "one@example.com")),
            json!({"type": "tarot", "result": "The tower"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json_body(response).await,
        json!({"error": "backend_unavailable"})
    );
}
