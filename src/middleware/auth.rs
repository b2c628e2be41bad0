// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session JWT middleware.
//!
//! Resolves the request principal without rejecting anything: the admin
//! gate and the fortune routes each decide what an absent principal means.
//!
//! Two credentials are accepted. The `fortune_session` cookie holds an HS256
//! session token issued by `POST /auth/session`. An `Authorization: Bearer`
//! header may carry either such a session token or a Firebase Auth ID token.

use crate::identity::Principal;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "fortune_session";

/// Lifetime of a session token and its cookie.
pub const SESSION_TTL_SECS: usize = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user uid)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Principal resolved for the current request (absent when signed out).
#[derive(Debug, Clone, Default)]
pub struct CurrentPrincipal(pub Option<Principal>);

/// Middleware that attaches a [`CurrentPrincipal`] to every request.
pub async fn resolve_principal(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let signing_key = &state.config.session_signing_key;

    // Cookie first, then header
    let mut principal = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| local_principal(cookie.value(), signing_key));

    if principal.is_none() {
        let bearer = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        if let Some(token) = bearer {
            principal = match verify_session_token(&token, signing_key) {
                Ok(principal) => Some(principal),
                Err(_) => match state.verifier.verify(&token).await {
                    Ok(principal) => Some(principal),
                    Err(e) => {
                        tracing::debug!(error = %e, "Ignoring invalid bearer token");
                        None
                    }
                },
            };
        }
    }

    request.extensions_mut().insert(CurrentPrincipal(principal));
    next.run(request).await
}

fn local_principal(token: &str, signing_key: &[u8]) -> Option<Principal> {
    match verify_session_token(token, signing_key) {
        Ok(principal) => Some(principal),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            None
        }
    }
}

/// Decode and validate a session token.
pub fn verify_session_token(
    token: &str,
    signing_key: &[u8],
) -> Result<Principal, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let claims = decode::<Claims>(token, &key, &validation)?.claims;

    Ok(Principal {
        uid: claims.sub,
        email: claims.email,
        email_verified: claims.email_verified,
    })
}

/// Create a JWT for a user session.
pub fn create_session_token(principal: &Principal, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: principal.uid.clone(),
        email: principal.email.clone(),
        email_verified: principal.email_verified,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// The `fortune_session` cookie carrying `token`.
///
/// Removal must use the same attributes, so logout builds it here too.
pub fn build_session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}
