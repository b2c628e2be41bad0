//! Database layer: the document-store seam and its backends.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreStore;
pub use self::memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;

/// Field mapping of a stored document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const FORTUNES: &str = "fortunes";
}

/// A document read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

/// Capabilities required from the backing document store.
///
/// Result order is whatever the store returns; callers must not assume any.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, unfiltered.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Documents in `collection` whose `field` equals `value`, filtered by the store.
    async fn get_filtered(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Overwrite the given fields of an existing document; all or nothing.
    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        partial: Fields,
    ) -> Result<(), StoreError>;

    /// Insert a new document and return the key the store assigned.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
}
