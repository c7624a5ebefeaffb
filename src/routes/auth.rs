// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Google OAuth authentication routes.
//!
//! Sign-in doubles as calendar authorization: the consent screen requests
//! the read-only calendar scope together with the identity scopes, so the
//! dashboard can fetch events without a second prompt.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::UserProfile;
use crate::services::calendar::{OAUTH_SCOPES, UPCOMING_EVENTS_LIMIT};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses FRONTEND_URL env var.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to the Google consent screen.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    // Encode frontend URL + timestamp in state, signed so the callback can
    // trust the redirect target.
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let state_payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(&state.config.oauth_state_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(state_payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed_state = format!("{}|{}", state_payload, hex::encode(signature));
    let oauth_state = URL_SAFE_NO_PAD.encode(signed_state.as_bytes());

    let callback_url = callback_url(&headers);

    // access_type=offline + prompt=consent so Google issues a refresh token;
    // without it the calendar stops working when the first token expires.
    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope={}&\
         access_type=offline&\
         prompt=consent&\
         state={}",
        state.config.google_client_id,
        urlencoding::encode(&callback_url),
        urlencoding::encode(OAUTH_SCOPES),
        oauth_state
    );

    tracing::info!(
        client_id = %state.config.google_client_id,
        frontend_url = %frontend_url,
        "Starting OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create the session.
///
/// First sign-in also creates the stub profile document and routes the user
/// to the questionnaire wizard; returning users with a complete profile go
/// straight to the dashboard.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    // Decode and verify frontend URL from state parameter
    let frontend_url = verify_and_decode_state(&params.state, &state.config.oauth_state_key)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid or tampered state parameter, falling back to default frontend URL"
            );
            state.config.frontend_url.clone()
        });

    // Check for OAuth errors (e.g. the user denied consent)
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let oauth_result = state
        .calendar_service
        .handle_oauth_callback(&code, &callback_url(&headers))
        .await?;

    // Create the profile document on first sign-in.
    let existing = state.db.get_profile(&oauth_result.uid).await?;
    let is_new_user = existing.is_none();

    if is_new_user {
        let stub = UserProfile::stub(
            oauth_result.uid.clone(),
            oauth_result.email.clone(),
            oauth_result.display_name.clone(),
            oauth_result.photo_url.clone(),
            format_utc_rfc3339(chrono::Utc::now()),
        );
        state.db.set_profile(&stub).await?;
        tracing::info!(uid = %oauth_result.uid, "New user profile created");

        // Post-registration calendar probe: warm the integration and log the
        // outcome, but never block sign-up on it.
        match state
            .calendar_service
            .list_upcoming_events(&oauth_result.uid, UPCOMING_EVENTS_LIMIT)
            .await
        {
            Ok(events) => {
                tracing::info!(
                    uid = %oauth_result.uid,
                    count = events.len(),
                    "Fetched calendar events after registration"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Post-registration calendar fetch failed, continuing anyway");
            }
        }
    }

    // New users and users who never finished the questionnaire land on the
    // wizard; everyone else goes to the dashboard.
    let next = match &existing {
        Some(profile) if profile.is_complete() => "/dashboard",
        _ => "/wizard",
    };

    let jwt = create_jwt(
        &oauth_result.uid,
        oauth_result.email.clone(),
        oauth_result.display_name.clone(),
        &state.config.jwt_signing_key,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(
        uid = %oauth_result.uid,
        is_new_user,
        next,
        "OAuth successful, session created"
    );

    let redirect_url = format!(
        "{}/callback?token={}&next={}",
        frontend_url,
        jwt,
        urlencoding::encode(next)
    );

    Ok(Redirect::temporary(&redirect_url))
}

/// Build the callback URL from the request's Host header.
fn callback_url(headers: &axum::http::HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            std::env::var("API_HOST").unwrap_or_else(|_| "localhost:8080".to_string())
        });

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/google/callback", scheme, host)
}

/// Verify HMAC signature and decode the frontend URL from the OAuth state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    // Reconstruct payload and verify signature
    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

/// Logout - the client clears its stored session token.
async fn logout() -> Redirect {
    Redirect::temporary("/")
}
