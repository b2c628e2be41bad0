// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::response::Response;
use fortune_admin::config::Config;
use fortune_admin::db::{FirestoreStore, Fields, MemoryStore};
use fortune_admin::identity::Principal;
use fortune_admin::middleware::auth::{create_session_token, SESSION_COOKIE};
use fortune_admin::routes::create_router;
use fortune_admin::services::{FirebaseTokenVerifier, LocaleRedirector};
use fortune_admin::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key id the test verifier trusts.
pub const TEST_KEY_ID: &str = "test-key";

const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/firebase_test_key.pem");
const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/firebase_test_key.pub.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore connection against the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store.
/// Returns the router, the shared state and the store for assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = Config::test_default();
    let verifier = FirebaseTokenVerifier::new_with_static_key(
        &config.firebase_project_id,
        TEST_KEY_ID,
        DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("test public key"),
    )
    .expect("test verifier");

    let state = Arc::new(AppState {
        config,
        store: store.clone(),
        locale: LocaleRedirector::default(),
        verifier: Arc::new(verifier),
    });

    (create_router(state.clone()), state, store)
}

#[allow(dead_code)]
pub fn admin_principal() -> Principal {
    Principal::new("admin-uid", Config::test_default().admin_email)
}

/// `Cookie` header value carrying a session for `principal`.
#[allow(dead_code)]
pub fn session_cookie(principal: &Principal) -> String {
    let token = create_session_token(principal, &Config::test_default().session_signing_key)
        .expect("token");
    format!("{SESSION_COOKIE}={token}")
}

#[allow(dead_code)]
pub fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().expect("object literal")
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// RS256 ID token as the auth service issues it, signed with the test key.
///
/// `overrides` replaces or adds claims (e.g. a foreign `aud`).
#[allow(dead_code)]
pub fn firebase_id_token(principal: &Principal, overrides: serde_json::Value) -> String {
    firebase_id_token_with_kid(principal, TEST_KEY_ID, overrides)
}

/// Like [`firebase_id_token`] but announcing signing key `kid`.
#[allow(dead_code)]
pub fn firebase_id_token_with_kid(
    principal: &Principal,
    kid: &str,
    overrides: serde_json::Value,
) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let project = Config::test_default().firebase_project_id;

    let mut claims = json!({
        "iss": format!("https://securetoken.google.com/{project}"),
        "aud": project,
        "sub": principal.uid,
        "user_id": principal.uid,
        "email": principal.email,
        "email_verified": principal.email_verified,
        "auth_time": now - 30,
        "iat": now - 30,
        "exp": now + 3600,
    });
    if let (Some(claims), Some(overrides)) = (claims.as_object_mut(), overrides.as_object()) {
        claims.extend(overrides.clone());
    }

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());

    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("test private key"),
    )
    .expect("id token")
}
