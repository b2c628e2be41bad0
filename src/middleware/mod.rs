// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session resolution, locale redirect, security headers).

pub mod auth;
pub mod locale;
pub mod security;

pub use auth::resolve_principal;
pub use locale::redirect_by_locale;
