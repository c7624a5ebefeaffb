// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Questionnaire wizard routes.
//!
//! Each operation returns the rendered view of the single active step.
//! Validation failures are part of the view (`error`), mirroring the inline
//! message the form shows; only malformed requests become HTTP errors.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Answer;
use crate::services::WizardView;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wizard", get(get_wizard))
        .route("/api/wizard/answer", post(set_answer))
        .route("/api/wizard/advance", post(advance))
        .route("/api/wizard/back", post(back))
        .route("/api/wizard/submit", post(submit))
}

/// Current step view (creates the session on first access).
async fn get_wizard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<WizardView> {
    Json(state.wizard_service.view(&user.uid))
}

#[derive(Deserialize)]
struct AnswerRequest {
    field: String,
    value: Answer,
}

/// Record an answer for any field.
async fn set_answer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<WizardView>> {
    let view = state
        .wizard_service
        .set_answer(&user.uid, &req.field, req.value)?;
    Ok(Json(view))
}

/// Advance to the next step (refused inline when unanswered).
async fn advance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<WizardView> {
    Json(state.wizard_service.advance(&user.uid))
}

/// Go back one step.
async fn back(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<WizardView> {
    Json(state.wizard_service.retreat(&user.uid))
}

/// Submit the completed questionnaire.
async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WizardView>> {
    let view = state.wizard_service.submit(&user).await?;
    Ok(Json(view))
}
