// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fortune Admin: admin console and user-scoped fortune history
//!
//! This crate serves the admin console (session gate, users and fortunes
//! tables, user flag actions), the fortune history API for signed-in users,
//! and the static site behind a first-visit locale redirect.

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{FirebaseTokenVerifier, LocaleRedirector};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub locale: LocaleRedirector,
    /// Verifies ID tokens from the auth service
    pub verifier: Arc<FirebaseTokenVerifier>,
}
