// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

use fit_nutrition::config::Config;
use fit_nutrition::db::FirestoreDb;
use fit_nutrition::routes::create_router;
use fit_nutrition::services::{calendar::CalendarService, WizardService};
use fit_nutrition::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let token_cache = Arc::new(dashmap::DashMap::new());
    let refresh_locks = Arc::new(dashmap::DashMap::new());

    let calendar_service = CalendarService::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        db.clone(),
        token_cache,
        refresh_locks,
    );

    let wizard_service = WizardService::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        calendar_service,
        wizard_service,
    });

    (create_router(state.clone()), state)
}

/// Create a session JWT the way the auth callback does.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    fit_nutrition::middleware::auth::create_jwt(
        uid,
        Some(format!("{}@example.com", uid)),
        Some("Test Runner".to_string()),
        signing_key,
    )
    .expect("Failed to create JWT")
}
