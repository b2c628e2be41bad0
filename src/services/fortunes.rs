// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fortune history scoped to the signed-in principal.

use crate::db::{collections, DocumentStore, Fields};
use crate::error::StoreError;
use crate::identity::IdentityProvider;
use crate::models::fortune::{NewFortune, OWNER_FIELD};
use std::sync::Arc;

/// Result of [`FortuneStore::add_fortune`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddFortune {
    Stored { key: String },
    /// Nobody is signed in; nothing was written.
    SignedOut,
}

pub struct FortuneStore {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl FortuneStore {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Field maps of every fortune owned by the current principal.
    ///
    /// Signed out yields an empty list without touching the store.
    pub async fn user_fortunes(&self) -> Result<Vec<Fields>, StoreError> {
        let Some(principal) = self.identity.current_principal() else {
            return Ok(Vec::new());
        };

        let docs = self
            .store
            .get_filtered(collections::FORTUNES, OWNER_FIELD, &principal.uid)
            .await?;

        tracing::debug!(uid = %principal.uid, count = docs.len(), "Fetched user fortunes");
        Ok(docs.into_iter().map(|doc| doc.fields).collect())
    }

    /// Save a fortune for the current principal, stamped with the client clock.
    pub async fn add_fortune(
        &self,
        fortune_type: &str,
        result: &str,
    ) -> Result<AddFortune, StoreError> {
        let Some(principal) = self.identity.current_principal() else {
            tracing::warn!(fortune_type, "Cannot save a fortune without signing in");
            return Ok(AddFortune::SignedOut);
        };

        let fields = NewFortune {
            user_id: principal.uid.clone(),
            fortune_type: fortune_type.to_string(),
            result: result.to_string(),
            timestamp: chrono::Utc::now(),
        }
        .into_fields()?;

        let key = self.store.insert(collections::FORTUNES, fields).await?;
        tracing::info!(uid = %principal.uid, fortune_type, key = %key, "Fortune saved");
        Ok(AddFortune::Stored { key })
    }

    /// [`add_fortune`](Self::add_fortune) for callers that do not handle
    /// failures: errors are logged and dropped.
    pub async fn add_fortune_logged(&self, fortune_type: &str, result: &str) {
        if let Err(e) = self.add_fortune(fortune_type, result).await {
            tracing::error!(fortune_type, error = %e, "Failed to save fortune");
        }
    }
}
