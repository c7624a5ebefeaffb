// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Dashboard composition tests.
//!
//! With the offline mock store, both the profile read and the token lookup
//! fail; the dashboard must still answer 200 with the identity greeting and
//! degrade each panel independently.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

mod common;

async fn get_json(app: &axum::Router, token: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_dashboard_degrades_without_blocking_greeting() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("dash-user", &state.config.jwt_signing_key);

    let (status, body) = get_json(&app, &token, "/api/dashboard").await;

    // Both backends are down, yet the dashboard still renders.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["displayName"], "Test Runner");
    assert_eq!(body["profile"], Value::Null);
    assert_eq!(body["events"], serde_json::json!([]));
    assert!(body["calendarWarning"].is_string());
}

#[tokio::test]
async fn test_profile_read_surfaces_store_error() {
    // Unlike the dashboard, the dedicated profile view does not degrade.
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("dash-user", &state.config.jwt_signing_key);

    let (status, body) = get_json(&app, &token, "/api/profile").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
}

#[tokio::test]
async fn test_events_endpoint_reports_calendar_failure() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("dash-user", &state.config.jwt_signing_key);

    let (status, body) = get_json(&app, &token, "/api/events").await;
    // The offline store cannot produce a token, so the fetch fails loudly
    // here (the dashboard route is the one that degrades).
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
}

#[tokio::test]
async fn test_me_requires_working_store() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("dash-user", &state.config.jwt_signing_key);

    let (status, body) = get_json(&app, &token, "/api/me").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
}
