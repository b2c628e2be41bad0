// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console routes.
//!
//! Every request runs the session gate against the request principal.
//! Actions post back and redirect to `/admin` with the outcome as an
//! inline notice.

use crate::error::{AppError, Result};
use crate::identity::SessionIdentity;
use crate::middleware::auth::{build_session_cookie, CurrentPrincipal};
use crate::models::UserFlag;
use crate::services::admin::{
    escape_html, AdminView, GateDecision, Notice, RecordingSurface, ViewSnapshot,
    ADMIN_ONLY_NOTICE,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

const ADMIN_PATH: &str = "/admin";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ADMIN_PATH, get(admin_page))
        .route("/admin/users/{key}/free", post(set_free))
        .route("/admin/users/{key}/premium", post(set_premium))
        .route("/admin/logout", post(logout))
}

fn admin_view(state: &AppState) -> AdminView {
    AdminView::new(
        state.store.clone(),
        state.config.admin_email.clone(),
        state.config.login_page.clone(),
    )
}

/// Append one query parameter to `target`.
fn with_query(target: &str, name: &str, value: &str) -> String {
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{target}{separator}{name}={}", urlencoding::encode(value))
}

// ─── Page ────────────────────────────────────────────────────

/// Outcome of the previous action, carried across the redirect.
#[derive(Deserialize)]
struct PageParams {
    notice: Option<String>,
    error: Option<String>,
}

async fn admin_page(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    Query(params): Query<PageParams>,
) -> Response {
    let surface = RecordingSurface::new();

    match admin_view(&state)
        .on_auth_state(principal.as_ref(), &surface)
        .await
    {
        GateDecision::Denied => {
            let snapshot = surface.snapshot();
            let target = snapshot
                .redirect
                .unwrap_or_else(|| state.config.login_page.clone());
            let notice = snapshot
                .notices
                .first()
                .map(Notice::message)
                .unwrap_or(ADMIN_ONLY_NOTICE);
            Redirect::to(&with_query(&target, "notice", notice)).into_response()
        }
        GateDecision::Granted => {
            let snapshot = surface.snapshot();
            let mut notices = Vec::new();
            notices.extend(params.notice.map(Notice::Info));
            notices.extend(params.error.map(Notice::Error));
            notices.extend(snapshot.notices.iter().cloned());
            Html(render_page(&snapshot, &notices)).into_response()
        }
    }
}

fn render_page(snapshot: &ViewSnapshot, notices: &[Notice]) -> String {
    let banners: String = notices
        .iter()
        .map(|notice| {
            let (class, role) = match notice {
                Notice::Error(_) => ("notice notice-error", "alert"),
                Notice::Alert(_) | Notice::Info(_) => ("notice notice-info", "status"),
            };
            format!(
                "<p class=\"{class}\" role=\"{role}\">{}</p>",
                escape_html(notice.message())
            )
        })
        .collect();
    let rows = |rows: &Option<Vec<String>>| rows.as_deref().unwrap_or_default().concat();

    format!(
        "<!DOCTYPE html>\n<html lang=\"tr\">\n<head><meta charset=\"utf-8\">\
         <title>Yönetici Paneli</title></head>\n<body>\n\
         <header><h1>Yönetici Paneli</h1>\
         <form method=\"post\" action=\"/admin/logout\">\
         <button id=\"logoutBtn\" type=\"submit\">Çıkış Yap</button></form></header>\n\
         {banners}\n\
         <h2>Kullanıcılar</h2>\n<table><thead><tr><th>E-posta</th><th>Ücretsiz Hak Kullanıldı</th>\
         <th>Premium</th><th>İşlemler</th></tr></thead>\
         <tbody id=\"userTable\">{users}</tbody></table>\n\
         <h2>Fal Geçmişi</h2>\n<table><thead><tr><th>Kullanıcı</th><th>Tür</th>\
         <th>Soru</th><th>Tarih</th></tr></thead>\
         <tbody id=\"fortuneTable\">{fortunes}</tbody></table>\n\
         </body>\n</html>\n",
        users = rows(&snapshot.user_rows),
        fortunes = rows(&snapshot.fortune_rows),
    )
}

// ─── User Flags ──────────────────────────────────────────────

#[derive(Deserialize)]
struct FlagForm {
    value: bool,
}

async fn set_free(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    Path(key): Path<String>,
    Form(form): Form<FlagForm>,
) -> Result<Redirect> {
    update_flag(&state, principal, &key, UserFlag::FreeUsed, form.value).await
}

async fn set_premium(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    Path(key): Path<String>,
    Form(form): Form<FlagForm>,
) -> Result<Redirect> {
    update_flag(&state, principal, &key, UserFlag::Premium, form.value).await
}

async fn update_flag(
    state: &AppState,
    principal: Option<crate::identity::Principal>,
    key: &str,
    flag: UserFlag,
    value: bool,
) -> Result<Redirect> {
    let view = admin_view(state);
    if !view.is_admin(principal.as_ref()) {
        return Err(AppError::Forbidden);
    }

    let surface = RecordingSurface::new();
    let outcome = view.set_user_flag(key, flag, value, &surface).await;

    let snapshot = surface.snapshot();
    let message = snapshot
        .notices
        .first()
        .map(Notice::message)
        .unwrap_or_default();
    let param = if outcome.is_ok() { "notice" } else { "error" };

    Ok(Redirect::to(&with_query(ADMIN_PATH, param, message)))
}

// ─── Sign-Out ────────────────────────────────────────────────

/// End the session. No navigation: the next visit to the console is
/// rejected by the gate.
///
/// Session tokens are stateless, so this only removes the browser's cookie.
/// A copy of the token taken earlier stays valid until its `exp`
/// ([`SESSION_TTL_SECS`](crate::middleware::auth::SESSION_TTL_SECS) after
/// issue); rotate `SESSION_SIGNING_KEY` to revoke every session at once.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let identity = SessionIdentity::new(principal);
    admin_view(&state).sign_out(&identity).await?;

    tracing::info!("Admin session signed out");
    Ok((
        jar.remove(build_session_cookie(
            String::new(),
            state.config.secure_cookies(),
        )),
        StatusCode::NO_CONTENT,
    ))
}
