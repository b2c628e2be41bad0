// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fortune Admin server
//!
//! Serves the admin console, the fortune history API and the static site.

use fortune_admin::{
    config::Config,
    db::FirestoreStore,
    services::{FirebaseTokenVerifier, LocaleRedirector},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Fortune Admin");

    // Initialize Firestore database
    let store = FirestoreStore::new(&config.gcp_project_id).await?;

    // ID tokens from the auth service are checked against Google's keys
    let verifier = FirebaseTokenVerifier::new(&config.firebase_project_id)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        store: Arc::new(store),
        locale: LocaleRedirector::default(),
        verifier: Arc::new(verifier),
    });

    // Build router
    let app = fortune_admin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fortune_admin=debug,info")),
        )
        .with(format)
        .init();
}
