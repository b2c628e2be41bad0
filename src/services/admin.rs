// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console: session gate, the users/fortunes tables and the user flag
//! actions.
//!
//! The view never touches HTTP. It drives a [`ViewSurface`], which the
//! routes layer records and renders into a page.

use crate::db::{collections, DocumentStore, Fields};
use crate::error::StoreError;
use crate::identity::{IdentityProvider, Principal};
use crate::models::{FortuneRow, UserFlag, UserRecord};
use crate::time_utils::format_display;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const ADMIN_ONLY_NOTICE: &str = "Bu sayfa yalnızca yöneticiler içindir.";
const USERS_LOAD_FAILED: &str = "Kullanıcılar yüklenemedi.";
const FORTUNES_LOAD_FAILED: &str = "Fal geçmişi yüklenemedi.";
const UPDATE_FAILED: &str = "Kullanıcı güncellenemedi.";

const YES: &str = "Evet";
const NO: &str = "Hayır";
const ACTIVE: &str = "Aktif";
const INACTIVE: &str = "Pasif";
const RESET_FREE_LABEL: &str = "Ücretsiz Hakkı Sıfırla";
const MAKE_PREMIUM_LABEL: &str = "Premium Yap";
const PLACEHOLDER: &str = "-";

/// Confirmation shown after a successful flag write.
pub fn confirmation(flag: UserFlag) -> &'static str {
    match flag {
        UserFlag::FreeUsed => "Kullanıcı güncellendi.",
        UserFlag::Premium => "Kullanıcı premium yapıldı.",
    }
}

/// Table containers on the admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableId {
    Users,
    Fortunes,
}

impl TableId {
    pub fn element_id(self) -> &'static str {
        match self {
            TableId::Users => "userTable",
            TableId::Fortunes => "fortuneTable",
        }
    }
}

/// User-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Must be acknowledged before anything else happens (gate rejection)
    Alert(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Alert(msg) | Notice::Info(msg) | Notice::Error(msg) => msg,
        }
    }
}

/// Where the admin view writes its output.
pub trait ViewSurface: Send + Sync {
    /// Replace every row of `table`.
    fn replace_rows(&self, table: TableId, rows: Vec<String>);
    fn notify(&self, notice: Notice);
    /// Full-page navigation.
    fn redirect(&self, target: &str);
}

/// Everything a [`RecordingSurface`] has been told so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// `None` until the table has been rendered at least once
    pub user_rows: Option<Vec<String>>,
    pub fortune_rows: Option<Vec<String>>,
    pub notices: Vec<Notice>,
    pub redirect: Option<String>,
}

/// Surface that records view output for later rendering.
#[derive(Default)]
pub struct RecordingSurface {
    state: Mutex<ViewSnapshot>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut ViewSnapshot)) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state);
    }
}

impl ViewSurface for RecordingSurface {
    fn replace_rows(&self, table: TableId, rows: Vec<String>) {
        self.update(|state| match table {
            TableId::Users => state.user_rows = Some(rows),
            TableId::Fortunes => state.fortune_rows = Some(rows),
        });
    }

    fn notify(&self, notice: Notice) {
        self.update(|state| state.notices.push(notice));
    }

    fn redirect(&self, target: &str) {
        self.update(|state| state.redirect = Some(target.to_string()));
    }
}

/// Outcome of one auth-state callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Denied,
    Granted,
}

/// The admin console component.
pub struct AdminView {
    store: Arc<dyn DocumentStore>,
    admin_email: String,
    login_page: String,
}

impl AdminView {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        admin_email: impl Into<String>,
        login_page: impl Into<String>,
    ) -> Self {
        Self {
            store,
            admin_email: admin_email.into(),
            login_page: login_page.into(),
        }
    }

    /// Whether `principal` may use the console: a verified email equal to
    /// the configured address, compared case-sensitively.
    pub fn is_admin(&self, principal: Option<&Principal>) -> bool {
        principal.is_some_and(|p| {
            p.email_verified && p.email.as_deref() == Some(self.admin_email.as_str())
        })
    }

    /// Auth-state callback: reject and redirect, or load both tables.
    ///
    /// A rejected principal causes no store call at all.
    pub async fn on_auth_state(
        &self,
        principal: Option<&Principal>,
        surface: &dyn ViewSurface,
    ) -> GateDecision {
        if !self.is_admin(principal) {
            tracing::warn!(
                uid = principal.map(|p| p.uid.as_str()),
                "Rejected non-admin principal"
            );
            surface.notify(Notice::Alert(ADMIN_ONLY_NOTICE.to_string()));
            surface.redirect(&self.login_page);
            return GateDecision::Denied;
        }

        // Failures are already on the surface.
        let _ = futures_util::join!(self.load_users(surface), self.load_fortunes(surface));
        GateDecision::Granted
    }

    /// Subscribe once to `identity` and run the gate on every emission,
    /// starting with the current state.
    pub async fn attach(&self, identity: &dyn IdentityProvider, surface: &dyn ViewSurface) {
        self.watch_auth_state(identity.subscribe(), surface).await;
    }

    /// Run the gate for each auth-state value until the stream closes.
    pub async fn watch_auth_state(
        &self,
        mut auth_state: watch::Receiver<Option<Principal>>,
        surface: &dyn ViewSurface,
    ) {
        loop {
            let principal = auth_state.borrow_and_update().clone();
            self.on_auth_state(principal.as_ref(), surface).await;

            if auth_state.changed().await.is_err() {
                tracing::debug!("Auth-state stream closed");
                break;
            }
        }
    }

    /// Read the whole `users` collection and rebuild its table.
    ///
    /// On failure the previous rows stay in place and an error notice is shown.
    pub async fn load_users(&self, surface: &dyn ViewSurface) -> Result<usize, StoreError> {
        match self.store.get_all(collections::USERS).await {
            Ok(docs) => {
                let rows: Vec<String> = docs
                    .iter()
                    .map(|doc| render_user_row(&UserRecord::from_document(doc)))
                    .collect();
                let count = rows.len();
                surface.replace_rows(TableId::Users, rows);
                tracing::debug!(count, "Users table rendered");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load users");
                surface.notify(Notice::Error(USERS_LOAD_FAILED.to_string()));
                Err(e)
            }
        }
    }

    /// Read the whole `fortunes` collection and rebuild its table.
    pub async fn load_fortunes(&self, surface: &dyn ViewSurface) -> Result<usize, StoreError> {
        match self.store.get_all(collections::FORTUNES).await {
            Ok(docs) => {
                let rows: Vec<String> = docs
                    .iter()
                    .map(|doc| render_fortune_row(&FortuneRow::from_document(doc)))
                    .collect();
                let count = rows.len();
                surface.replace_rows(TableId::Fortunes, rows);
                tracing::debug!(count, "Fortunes table rendered");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load fortunes");
                surface.notify(Notice::Error(FORTUNES_LOAD_FAILED.to_string()));
                Err(e)
            }
        }
    }

    /// Overwrite one flag of user `key`, confirm, then rebuild the users
    /// table from a fresh read.
    ///
    /// The returned result reflects the write; a failed reload after a
    /// successful write is only reported on the surface.
    pub async fn set_user_flag(
        &self,
        key: &str,
        flag: UserFlag,
        value: bool,
        surface: &dyn ViewSurface,
    ) -> Result<(), StoreError> {
        let mut partial = Fields::new();
        partial.insert(flag.field().to_string(), Value::Bool(value));

        if let Err(e) = self
            .store
            .update_fields(collections::USERS, key, partial)
            .await
        {
            tracing::error!(key, field = flag.field(), value, error = %e, "User flag update failed");
            surface.notify(Notice::Error(UPDATE_FAILED.to_string()));
            return Err(e);
        }

        tracing::info!(key, field = flag.field(), value, "User flag updated");
        surface.notify(Notice::Info(confirmation(flag).to_string()));
        let _ = self.load_users(surface).await;
        Ok(())
    }

    pub async fn set_free(
        &self,
        key: &str,
        value: bool,
        surface: &dyn ViewSurface,
    ) -> Result<(), StoreError> {
        self.set_user_flag(key, UserFlag::FreeUsed, value, surface)
            .await
    }

    pub async fn set_premium(
        &self,
        key: &str,
        value: bool,
        surface: &dyn ViewSurface,
    ) -> Result<(), StoreError> {
        self.set_user_flag(key, UserFlag::Premium, value, surface)
            .await
    }

    /// End the session. Navigation is left to the next auth-state emission.
    pub async fn sign_out(&self, identity: &dyn IdentityProvider) -> Result<(), StoreError> {
        identity.sign_out().await
    }
}

/// One `<tr>` of the users table.
pub fn render_user_row(user: &UserRecord) -> String {
    let key = escape_html(&urlencoding::encode(&user.key));
    format!(
        "<tr><td>{email}</td><td>{free}</td><td>{premium}</td><td>\
         {reset}{upgrade}</td></tr>",
        email = escape_html(user.email.as_deref().unwrap_or(PLACEHOLDER)),
        free = if user.free_used { YES } else { NO },
        premium = if user.premium { ACTIVE } else { INACTIVE },
        reset = action_form(&key, UserFlag::FreeUsed, false, RESET_FREE_LABEL),
        upgrade = action_form(&key, UserFlag::Premium, true, MAKE_PREMIUM_LABEL),
    )
}

fn action_form(encoded_key: &str, flag: UserFlag, value: bool, label: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/admin/users/{encoded_key}/{segment}\">\
         <input type=\"hidden\" name=\"value\" value=\"{value}\">\
         <button type=\"submit\">{label}</button></form>",
        segment = flag.route_segment(),
    )
}

/// One `<tr>` of the fortunes table.
pub fn render_fortune_row(row: &FortuneRow) -> String {
    let cell = |value: &Option<String>| escape_html(value.as_deref().unwrap_or(PLACEHOLDER));
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        cell(&row.user),
        cell(&row.fortune_type),
        cell(&row.question),
        row.created_at
            .map(format_display)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    )
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
