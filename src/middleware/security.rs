// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Pages may load their own assets and post forms back to this origin only.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; object-src 'none'; \
     form-action 'self'; frame-ancestors 'none'; base-uri 'none'";

/// Static site pages run the auth and store client SDKs in the browser,
/// loaded from gstatic and talking to Google APIs.
const STATIC_PAGE_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' https://www.gstatic.com https://apis.google.com; \
     connect-src 'self' https://*.googleapis.com; \
     frame-src 'self' https://*.firebaseapp.com; \
     img-src 'self' data: https:; style-src 'self' 'unsafe-inline'; \
     object-src 'none'; frame-ancestors 'none'; base-uri 'none'";

/// Add security headers to all responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    // Routes that set their own policy keep it
    headers
        .entry(header::CONTENT_SECURITY_POLICY)
        .or_insert(HeaderValue::from_static(CONTENT_SECURITY_POLICY));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("same-origin"),
    );

    response
}

/// Content security policy for the static site fallback.
pub async fn add_static_page_policy(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(STATIC_PAGE_CONTENT_SECURITY_POLICY),
    );
    response
}
