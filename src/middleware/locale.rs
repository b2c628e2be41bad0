// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locale redirect middleware for static pages.

use crate::services::locale::{browser_language, PREFERENCE_KEY};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Send first-time visitors with a matching browser language to the
/// localized variant of the requested page.
pub async fn redirect_by_locale(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let language = request
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .and_then(browser_language);
    let preference = jar.get(PREFERENCE_KEY).map(|c| c.value());

    match state
        .locale
        .decide(request.uri().path(), preference, language)
    {
        Some(target) => {
            tracing::debug!(
                from = %request.uri().path(),
                to = %target,
                language = ?language,
                "Redirecting to localized page"
            );
            Redirect::temporary(&target).into_response()
        }
        None => next.run(request).await,
    }
}
