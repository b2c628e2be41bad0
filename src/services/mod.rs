// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod admin;
pub mod firebase_auth;
pub mod fortunes;
pub mod locale;

pub use admin::{AdminView, GateDecision, Notice, RecordingSurface, TableId, ViewSurface};
pub use firebase_auth::FirebaseTokenVerifier;
pub use fortunes::{AddFortune, FortuneStore};
pub use locale::LocaleRedirector;
