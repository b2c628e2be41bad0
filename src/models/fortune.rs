//! Fortune records.
//!
//! Two shapes live in the `fortunes` collection. The admin table reads
//! `user`/`question`/`createdAt`, while fortunes saved for a signed-in user
//! carry `userId`/`result`/`timestamp`. Both are kept as-is so existing
//! documents keep rendering; `type` is the only field they share.
//!
//! Timestamps drift too. Browser clients store native Firestore timestamps,
//! while [`NewFortune`] goes through the schema-free field map and stores an
//! RFC3339 string. Readers accept both (see
//! [`parse_stored_timestamp`](crate::time_utils::parse_stored_timestamp)).

use crate::db::{Document, Fields};
use crate::error::StoreError;
use crate::time_utils::{format_utc_rfc3339, parse_stored_timestamp};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Owner field of fortunes written through [`NewFortune`].
pub const OWNER_FIELD: &str = "userId";

/// Fortune as rendered in the admin table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortuneRow {
    pub user: Option<String>,
    pub fortune_type: Option<String>,
    pub question: Option<String>,
    /// `None` for legacy records without a usable `createdAt`
    pub created_at: Option<DateTime<Utc>>,
}

impl FortuneRow {
    pub fn from_document(doc: &Document) -> Self {
        let text = |name: &str| {
            doc.fields
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            user: text("user"),
            fortune_type: text("type"),
            question: text("question"),
            created_at: doc.fields.get("createdAt").and_then(parse_stored_timestamp),
        }
    }
}

/// Fortune saved for the signed-in principal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFortune {
    pub user_id: String,
    #[serde(rename = "type")]
    pub fortune_type: String,
    pub result: String,
    /// Client clock at creation
    #[serde(serialize_with = "serialize_rfc3339")]
    pub timestamp: DateTime<Utc>,
}

fn serialize_rfc3339<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_utc_rfc3339(*date))
}

impl NewFortune {
    pub fn into_fields(self) -> Result<Fields, StoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(StoreError::Serialization(format!(
                "fortune serialized to non-object: {other}"
            ))),
            Err(e) => Err(StoreError::Serialization(e.to_string())),
        }
    }
}
