//! User record as seen by the admin console.

use crate::db::Document;
use serde_json::Value;

/// User document in the `users` collection.
///
/// Missing or non-boolean flags read as `false`; the backend owns defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Document key (the user's uid)
    pub key: String,
    pub email: Option<String>,
    /// Has consumed the one free usage
    pub free_used: bool,
    /// Has an active paid entitlement
    pub premium: bool,
}

impl UserRecord {
    pub fn from_document(doc: &Document) -> Self {
        let flag = |name: &str| doc.fields.get(name).and_then(Value::as_bool).unwrap_or(false);
        Self {
            key: doc.key.clone(),
            email: doc
                .fields
                .get("email")
                .and_then(Value::as_str)
                .map(str::to_string),
            free_used: flag(UserFlag::FreeUsed.field()),
            premium: flag(UserFlag::Premium.field()),
        }
    }
}

/// The two admin-writable boolean fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFlag {
    FreeUsed,
    Premium,
}

impl UserFlag {
    /// Stored field name.
    pub fn field(self) -> &'static str {
        match self {
            UserFlag::FreeUsed => "freeUsed",
            UserFlag::Premium => "premium",
        }
    }

    /// Route segment used by the admin action forms.
    pub fn route_segment(self) -> &'static str {
        match self {
            UserFlag::FreeUsed => "free",
            UserFlag::Premium => "premium",
        }
    }
}
