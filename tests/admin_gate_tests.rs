// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console gate tests.
//!
//! These tests verify that:
//! 1. Anyone but the configured admin is redirected to the login page
//!    without a single store call
//! 2. The admin gets both tables rendered from one read of each collection

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fortune_admin::db::memory::StoreCall;
use fortune_admin::identity::Principal;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{admin_principal, body_string, create_test_app, fields, session_cookie};

fn admin_request(cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/admin");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_signed_out_visitor_is_redirected() {
    let (app, _, store) = create_test_app();

    let response = app.oneshot(admin_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login.html?notice="));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_other_principals_are_redirected_without_store_calls() {
    let (app, _, store) = create_test_app();

    let mut unverified = admin_principal();
    unverified.email_verified = false;
    let principals = [
        Principal::new("u1", "someone@example.com"),
        Principal::new("u2", "ADMIN@example.com"),
        unverified,
    ];

    for principal in principals {
        let response = app
            .clone()
            .oneshot(admin_request(Some(session_cookie(&principal))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{principal:?}");
        assert_eq!(
            location(&response),
            format!(
                "/login.html?notice={}",
                urlencoding::encode("Bu sayfa yalnızca yöneticiler içindir.")
            )
        );
    }
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_token_counts_as_signed_out() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_admin_sees_both_tables() {
    let (app, _, store) = create_test_app();
    store.seed(
        "users",
        "u1",
        fields(json!({"email": "one@example.com", "freeUsed": true, "premium": true})),
    );
    store.seed("users", "u2", fields(json!({"email": "two@example.com"})));
    store.seed(
        "fortunes",
        "f1",
        fields(json!({"user": "one@example.com", "type": "tarot", "question": "Q1"})),
    );

    let response = app
        .oneshot(admin_request(Some(session_cookie(&admin_principal()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let mut calls = store.calls();
    calls.sort_by_key(|c| format!("{c:?}"));
    assert_eq!(
        calls,
        vec![
            StoreCall::GetAll {
                collection: "fortunes".to_string()
            },
            StoreCall::GetAll {
                collection: "users".to_string()
            },
        ]
    );

    let body = body_string(response).await;
    let first = body.find("<td>one@example.com</td><td>Evet</td><td>Aktif</td>");
    let second = body.find("<td>two@example.com</td><td>Hayır</td><td>Pasif</td>");
    assert!(first.is_some() && second.is_some());
    assert!(first < second, "rows must keep store order");
    assert!(body.contains("<tr><td>one@example.com</td><td>tarot</td><td>Q1</td><td>-</td></tr>"));
    assert!(body.contains("id=\"logoutBtn\""));
}

#[tokio::test]
async fn test_admin_page_reports_read_failure_inline() {
    let (app, _, store) = create_test_app();
    store.set_unavailable(true);

    let response = app
        .oneshot(admin_request(Some(session_cookie(&admin_principal()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Kullanıcılar yüklenemedi."));
    assert!(body.contains("Fal geçmişi yüklenemedi."));
    assert!(body.contains("<tbody id=\"userTable\"></tbody>"));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/fortunes")
                .header(header::ORIGIN, "http://localhost:5173")
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
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}
