// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CalendarEvent, ProfileUpdate, UserProfile};
use crate::services::calendar::UPCOMING_EVENTS_LIMIT;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/events", get(get_events))
        .route("/api/profile", get(get_profile).patch(update_profile))
}

// ─── Current User ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Whether the questionnaire has been completed.
    pub profile_complete: bool,
}

/// Get the current identity snapshot plus questionnaire status.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let profile = state.db.get_profile(&user.uid).await?;

    Ok(Json(MeResponse {
        uid: user.uid,
        email: user.email,
        display_name: user.display_name,
        profile_complete: profile.is_some_and(|p| p.is_complete()),
    }))
}

// ─── Dashboard ───────────────────────────────────────────────

/// Everything the dashboard renders in one response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Greeting name from the identity snapshot, never from the profile
    pub display_name: Option<String>,
    /// Stored profile, or null when absent or unreadable
    pub profile: Option<UserProfile>,
    /// Upcoming events; empty when the calendar is empty or unavailable
    pub events: Vec<CalendarEvent>,
    /// Non-blocking warning when the calendar could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_warning: Option<String>,
}

/// Compose the dashboard: profile read and event fetch run concurrently,
/// and neither failing blocks the other.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let (profile_result, events_result) = futures_util::join!(
        state.db.get_profile(&user.uid),
        state
            .calendar_service
            .list_upcoming_events(&user.uid, UPCOMING_EVENTS_LIMIT),
    );

    let profile = match profile_result {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Profile read failed, dashboard degrades");
            None
        }
    };

    let (events, calendar_warning) = match events_result {
        Ok(events) => (events, None),
        Err(AppError::CalendarAuth) => (
            vec![],
            Some("Connect your Google Calendar to see upcoming events.".to_string()),
        ),
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Calendar fetch failed, dashboard degrades");
            (
                vec![],
                Some("Could not load calendar events.".to_string()),
            )
        }
    };

    Ok(Json(DashboardResponse {
        display_name: user.display_name,
        profile,
        events,
        calendar_warning,
    }))
}

// ─── Calendar Events ─────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// List upcoming events directly (the dashboard's calendar panel refresh).
///
/// Unlike the dashboard composition, errors surface here so the client can
/// distinguish a missing authorization from an empty calendar.
async fn get_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EventsResponse>> {
    let events = state
        .calendar_service
        .list_upcoming_events(&user.uid, UPCOMING_EVENTS_LIMIT)
        .await?;

    Ok(Json(EventsResponse { events }))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the stored profile for the profile-editing view.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .db
        .get_profile(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", user.uid)))?;

    Ok(Json(profile))
}

/// Merge-update individual profile fields from the profile-editing view.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    if update.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let profile = state.db.update_profile(&user.uid, &update).await?;

    tracing::info!(uid = %user.uid, "Profile updated");
    Ok(Json(profile))
}
