// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fortune_admin::error::{AppError, StoreError};

#[test]
fn test_store_errors_map_to_app_errors() {
    assert!(matches!(
        AppError::from(StoreError::AuthRequired),
        AppError::Unauthorized
    ));
    assert!(matches!(
        AppError::from(StoreError::not_found("users", "u1")),
        AppError::NotFound(msg) if msg == "Document not found: users/u1"
    ));
    assert!(matches!(
        AppError::from(StoreError::Unavailable("down".to_string())),
        AppError::Database(msg) if msg == "down"
    ));
}

#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden, StatusCode::FORBIDDEN),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Database("x".to_string()), StatusCode::SERVICE_UNAVAILABLE),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}
