// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider seam: the signed-in principal and its auth-state stream.

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The authenticated identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user identifier (also the `users` document key)
    pub uid: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl Principal {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            email_verified: true,
        }
    }
}

/// Capabilities required from the authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Principal of the current session, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// Auth-state stream. The receiver starts at the current state and is
    /// notified on every transition, including re-emission of the same
    /// principal after a token refresh.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;

    /// End the session. Emits one `None` on the auth-state stream.
    async fn sign_out(&self) -> Result<(), StoreError>;
}

/// In-process identity provider backed by a `watch` channel.
///
/// The HTTP layer builds one per request from the verified session token.
pub struct SessionIdentity {
    state: watch::Sender<Option<Principal>>,
}

impl SessionIdentity {
    pub fn new(principal: Option<Principal>) -> Self {
        let (state, _) = watch::channel(principal);
        Self { state }
    }

    /// Record a sign-in (or token refresh) and notify subscribers.
    pub fn sign_in(&self, principal: Principal) {
        tracing::debug!(uid = %principal.uid, "Auth state: signed in");
        self.state.send_replace(Some(principal));
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        tracing::debug!("Auth state: signed out");
        self.state.send_replace(None);
        Ok(())
    }
}
