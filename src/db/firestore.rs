// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of [`DocumentStore`].
//!
//! Documents are read and written as plain field maps so the admin view and
//! the fortune store can share one backend without fixing a schema here.

use crate::db::{Document, DocumentStore, Fields};
use crate::error::StoreError;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde::Deserialize;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

/// Key of a freshly inserted document.
#[derive(Deserialize)]
struct InsertedKey {
    #[serde(alias = "_firestore_id")]
    key: Option<String>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation fails with `Unavailable`.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or_else(|| {
            StoreError::Unavailable("Database not connected (offline mode)".to_string())
        })
    }
}

/// Convert a raw Firestore document into a keyed field map.
fn to_document(doc: &firestore::FirestoreDocument) -> Result<Document, StoreError> {
    let key = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let fields: Fields = firestore::FirestoreDb::deserialize_doc_to(doc)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(Document { key, fields })
}

fn backend_error(err: FirestoreError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .query()
            .await
            .map_err(backend_error)?;

        tracing::debug!(collection, count = docs.len(), "Fetched collection");
        docs.iter().map(to_document).collect()
    }

    async fn get_filtered(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .query()
            .await
            .map_err(backend_error)?;

        docs.iter().map(to_document).collect()
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        partial: Fields,
    ) -> Result<(), StoreError> {
        let field_paths: Vec<String> = partial.keys().cloned().collect();

        let result: Result<Fields, FirestoreError> = self
            .get_client()?
            .fluent()
            .update()
            .fields(field_paths)
            .in_col(collection)
            .precondition(firestore::FirestoreWritePrecondition::Exists(true))
            .document_id(key)
            .object(&partial)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataNotFoundError(_)) => {
                Err(StoreError::not_found(collection, key))
            }
            Err(e) => Err(backend_error(e)),
        }
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let inserted: InsertedKey = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .generate_document_id()
            .object(&fields)
            .execute()
            .await
            .map_err(backend_error)?;

        inserted.key.ok_or_else(|| {
            StoreError::Serialization("Firestore returned no document id".to_string())
        })
    }
}
