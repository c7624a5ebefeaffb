// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Profile-editing input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn patch_profile(app: &axum::Router, token: &str, body: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/profile")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("edit-user", &state.config.jwt_signing_key);

    let status = patch_profile(&app, &token, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("edit-user", &state.config.jwt_signing_key);

    // Identity metadata is not editable through this surface.
    let status = patch_profile(&app, &token, r#"{"uid":"someone-else"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_enum_value_is_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("edit-user", &state.config.jwt_signing_key);

    let status = patch_profile(&app, &token, r#"{"coffeeIntake":"6+"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_valid_update_reaches_store() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("edit-user", &state.config.jwt_signing_key);

    // Passes validation; the offline store then fails the read.
    let status = patch_profile(&app, &token, r#"{"weight":81.5}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
