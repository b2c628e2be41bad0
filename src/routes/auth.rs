// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: trade an auth-service ID token for a session cookie.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{build_session_cookie, create_session_token};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/session", post(create_session))
}

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// ID token from the auth service's client SDK
    #[serde(default)]
    pub id_token: String,
}

/// Verify the ID token and set the `fortune_session` cookie.
///
/// A rejected token is `401`; failing to reach the key service is `503`.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<SessionRequest>,
) -> Result<(CookieJar, StatusCode)> {
    let id_token = request.id_token.trim();
    if id_token.is_empty() {
        return Err(AppError::BadRequest("idToken is required".to_string()));
    }

    let principal = state.verifier.verify(id_token).await?;
    let token = create_session_token(&principal, &state.config.session_signing_key)?;

    tracing::info!(
        uid = %principal.uid,
        email_verified = principal.email_verified,
        "Session created"
    );

    Ok((
        jar.add(build_session_cookie(token, state.config.secure_cookies())),
        StatusCode::NO_CONTENT,
    ))
}
