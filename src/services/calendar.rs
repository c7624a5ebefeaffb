// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Google Calendar client for fetching upcoming events.
//!
//! Handles:
//! - OAuth code exchange and userinfo lookup at sign-in
//! - Upcoming-event listing for the dashboard
//! - Token refresh when expired
//!
//! The rest of the system only sees the async adapter contract; the
//! Calendar API's shape stays behind this module.

use crate::error::AppError;
use crate::models::event::{CalendarEvent, GoogleEvent, GoogleEventList};
use serde::Deserialize;

const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested at sign-in.
pub const OAUTH_SCOPES: &str =
    "openid email profile https://www.googleapis.com/auth/calendar.readonly";

/// Google Calendar API client.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl CalendarClient {
    /// Create a new client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: CALENDAR_BASE_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// List upcoming single events from the user's primary calendar.
    ///
    /// Mirrors the parameters the product has always used: future events
    /// only, recurring series expanded, ordered by start time.
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: &str,
        max_results: u32,
    ) -> Result<Vec<GoogleEvent>, AppError> {
        let url = format!("{}/calendars/primary/events", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min),
                ("maxResults", &max_results.to_string()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        let list: GoogleEventList = self.check_response_json(response).await?;
        Ok(list.items)
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(OAUTH_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(OAUTH_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Get the signed-in user's identity from the userinfo endpoint.
    pub async fn get_userinfo(&self, access_token: &str) -> Result<GoogleUserinfo, AppError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Rejected or revoked token: the user must re-consent
            if status.as_u16() == 401 {
                tracing::warn!("Google API rejected access token (401)");
                return Err(AppError::CalendarAuth);
            }

            return Err(AppError::CalendarApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("JSON parse error: {}", e)))
    }
}

/// OAuth token endpoint response (code exchange and refresh).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only present on the initial consent, not on refreshes
    pub refresh_token: Option<String>,
    /// Lifetime in seconds from now
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Identity from the OAuth userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserinfo {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// CalendarService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::FirestoreDb;
use crate::models::GoogleTokens;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// How many upcoming events a dashboard load fetches.
pub const UPCOMING_EVENTS_LIMIT: u32 = 10;

/// Cached access token with expiry information.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Shared token cache type for use in AppState.
pub type TokenCache = Arc<DashMap<String, CachedToken>>;

/// Shared refresh locks type for use in AppState.
pub type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// High-level calendar service that manages the token lifecycle.
///
/// This service encapsulates:
/// - Token retrieval from Firestore
/// - Automatic refresh when expiring (with 5-minute margin)
/// - Storage of refreshed tokens
/// - In-memory token caching to skip repeated Firestore reads
/// - Per-user locking to prevent duplicate refresh calls
/// - Event normalization into `CalendarEvent`
#[derive(Clone)]
pub struct CalendarService {
    client: CalendarClient,
    db: FirestoreDb,
    token_cache: TokenCache,
    refresh_locks: RefreshLocks,
}

impl CalendarService {
    /// Create a new calendar service with a shared token cache.
    pub fn new(
        client_id: String,
        client_secret: String,
        db: FirestoreDb,
        token_cache: TokenCache,
        refresh_locks: RefreshLocks,
    ) -> Self {
        Self {
            client: CalendarClient::new(client_id, client_secret),
            db,
            token_cache,
            refresh_locks,
        }
    }

    // ─── Adapter Contract ────────────────────────────────────────────────────

    /// List up to `max` upcoming events, ordered by start time.
    ///
    /// An empty calendar yields an empty vec. A missing or revoked token
    /// yields `CalendarAuth`; the caller decides whether that becomes a
    /// consent prompt or a non-blocking warning. Failures are never retried
    /// here.
    pub async fn list_upcoming_events(
        &self,
        uid: &str,
        max: u32,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let access_token = self.get_valid_access_token(uid).await?;
        let time_min = format_utc_rfc3339(Utc::now());

        let items = self
            .client
            .list_events(&access_token, &time_min, max)
            .await?;

        Ok(items
            .into_iter()
            .filter_map(CalendarEvent::from_api)
            .collect())
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user.
    ///
    /// Fast path is the in-memory cache. On miss or expiry, a per-user lock
    /// serializes the Firestore read and refresh so concurrent requests do
    /// not race each other into duplicate refresh calls.
    pub async fn get_valid_access_token(&self, uid: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        if let Some(cached) = self.token_cache.get(uid) {
            if now + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
            // Expired or expiring soon - fall through to refresh
        }

        let lock = self
            .refresh_locks
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = self.token_cache.get(uid) {
            if now + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let tokens = self.db.get_tokens(uid).await?.ok_or(AppError::CalendarAuth)?;

        let expires_at = DateTime::parse_from_rfc3339(&tokens.expires_at)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to parse expiry: {}", e)))?
            .with_timezone(&Utc);

        if now + margin < expires_at {
            self.token_cache.insert(
                uid.to_string(),
                CachedToken {
                    access_token: tokens.access_token.clone(),
                    expires_at,
                },
            );
            return Ok(tokens.access_token);
        }

        tracing::info!(uid, "Access token expired, refreshing");

        // Without a refresh token there is nothing to do but re-consent.
        let refresh_token = tokens.refresh_token.as_deref().ok_or(AppError::CalendarAuth)?;
        let refreshed = self.client.refresh_token(refresh_token).await?;

        let new_expires_at = now + Duration::seconds(refreshed.expires_in);
        let updated_tokens = GoogleTokens {
            access_token: refreshed.access_token.clone(),
            // Google usually omits the refresh token on refresh; keep ours
            refresh_token: refreshed
                .refresh_token
                .or_else(|| tokens.refresh_token.clone()),
            expires_at: new_expires_at.to_rfc3339(),
            scopes: tokens.scopes.clone(),
        };

        self.db.set_tokens(uid, &updated_tokens).await?;

        self.token_cache.insert(
            uid.to_string(),
            CachedToken {
                access_token: refreshed.access_token.clone(),
                expires_at: new_expires_at,
            },
        );

        tracing::info!(uid, "Token refreshed and cached");
        Ok(refreshed.access_token)
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Handle OAuth callback: exchange code for tokens, resolve the identity,
    /// and store the tokens.
    pub async fn handle_oauth_callback(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthResult, AppError> {
        let token_response = self.client.exchange_code(code, redirect_uri).await?;
        let userinfo = self
            .client
            .get_userinfo(&token_response.access_token)
            .await?;

        let now = Utc::now();
        let expires_at = now + Duration::seconds(token_response.expires_in);

        let scopes = token_response
            .scope
            .as_deref()
            .unwrap_or(OAUTH_SCOPES)
            .split_whitespace()
            .map(String::from)
            .collect();

        let tokens = GoogleTokens {
            access_token: token_response.access_token.clone(),
            refresh_token: token_response.refresh_token,
            expires_at: expires_at.to_rfc3339(),
            scopes,
        };

        self.db.set_tokens(&userinfo.id, &tokens).await?;

        self.token_cache.insert(
            userinfo.id.clone(),
            CachedToken {
                access_token: token_response.access_token,
                expires_at,
            },
        );

        tracing::info!(
            uid = %userinfo.id,
            "OAuth callback handled, tokens stored"
        );

        Ok(OAuthResult {
            uid: userinfo.id,
            email: userinfo.email,
            display_name: userinfo.name,
            photo_url: userinfo.picture,
        })
    }
}

/// Result of handling OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}
