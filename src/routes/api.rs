// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fortune history API for the signed-in user.

use crate::db::Fields;
use crate::error::Result;
use crate::identity::{Principal, SessionIdentity};
use crate::middleware::auth::CurrentPrincipal;
use crate::services::fortunes::{AddFortune, FortuneStore};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/fortunes", get(list_fortunes).post(add_fortune))
}

fn fortune_store(state: &AppState, principal: Option<Principal>) -> FortuneStore {
    FortuneStore::new(
        state.store.clone(),
        Arc::new(SessionIdentity::new(principal)),
    )
}

/// Fortunes of the current user; empty when signed out.
async fn list_fortunes(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
) -> Result<Json<Vec<Fields>>> {
    let fortunes = fortune_store(&state, principal).user_fortunes().await?;
    Ok(Json(fortunes))
}

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddFortuneRequest {
    #[serde(rename = "type")]
    pub fortune_type: String,
    pub result: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddFortuneResponse {
    /// `false` when nobody was signed in and nothing was written
    pub stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Save a fortune for the current user.
async fn add_fortune(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    Json(request): Json<AddFortuneRequest>,
) -> Result<(StatusCode, Json<AddFortuneResponse>)> {
    let outcome = fortune_store(&state, principal)
        .add_fortune(&request.fortune_type, &request.result)
        .await?;

    Ok(match outcome {
        AddFortune::Stored { key } => (
            StatusCode::CREATED,
            Json(AddFortuneResponse {
                stored: true,
                key: Some(key),
            }),
        ),
        AddFortune::SignedOut => (
            StatusCode::OK,
            Json(AddFortuneResponse {
                stored: false,
                key: None,
            }),
        ),
    })
}
