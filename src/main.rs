// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! FitNutrition API Server
//!
//! Serves the questionnaire wizard, stored user profiles, and the dashboard
//! composition backed by Firestore and the Google Calendar API.

use fit_nutrition::{
    config::Config,
    db::FirestoreDb,
    services::{calendar::CalendarService, WizardService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting FitNutrition API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Shared token cache and refresh locks for calendar access
    let token_cache = Arc::new(dashmap::DashMap::new());
    let refresh_locks = Arc::new(dashmap::DashMap::new());
    tracing::info!("Token cache initialized");

    let calendar_service = CalendarService::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        db.clone(),
        token_cache,
        refresh_locks,
    );

    let wizard_service = WizardService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        calendar_service,
        wizard_service,
    });

    // Build router
    let app = fit_nutrition::routes::create_router(state);

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
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fit_nutrition=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
