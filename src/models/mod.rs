// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod fortune;
pub mod user;

pub use fortune::{FortuneRow, NewFortune};
pub use user::{UserFlag, UserRecord};
