// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`DocumentStore`] used by tests and local runs without Firestore.
//!
//! Collections keep insertion order, and every call is recorded so callers
//! can assert exactly which reads and writes a component issued.

use crate::db::{Document, DocumentStore, Fields};
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetAll { collection: String },
    GetFiltered { collection: String, field: String, value: String },
    UpdateFields { collection: String, key: String },
    Insert { collection: String },
}

#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
    calls: Mutex<Vec<StoreCall>>,
    next_key: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document with a chosen key, replacing any previous one.
    pub fn seed(&self, collection: &str, key: &str, fields: Fields) {
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        docs.retain(|doc| doc.key != key);
        docs.push(Document {
            key: key.to_string(),
            fields,
        });
    }

    /// Read one document directly, bypassing call recording.
    pub fn document(&self, collection: &str, key: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.key == key).cloned())
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.record(StoreCall::GetAll {
            collection: collection.to_string(),
        })?;

        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.clone())
            .unwrap_or_default())
    }

    async fn get_filtered(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.record(StoreCall::GetFiltered {
            collection: collection.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })?;

        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.fields.get(field).and_then(|v| v.as_str()) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        partial: Fields,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateFields {
            collection: collection.to_string(),
            key: key.to_string(),
        })?;

        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, key))?;
        let doc = docs
            .iter_mut()
            .find(|doc| doc.key == key)
            .ok_or_else(|| StoreError::not_found(collection, key))?;
        doc.fields.extend(partial);
        Ok(())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.record(StoreCall::Insert {
            collection: collection.to_string(),
        })?;

        let key = format!("mem-{:08}", self.next_key.fetch_add(1, Ordering::SeqCst) + 1);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                key: key.clone(),
                fields,
            });
        Ok(key)
    }
}
