// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (questionnaire answers + identity metadata)
//! - Google OAuth tokens
//!
//! There is no caching and no local mirror: every call is one round trip,
//! and concurrent writers are last-write-wins.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{GoogleTokens, ProfileUpdate, UserProfile};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator ignores credentials; hand it a dummy token so local
        // runs never pick up real application-default credentials.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::new_emulator(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    async fn new_emulator(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());
        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's profile by uid. Absent documents are `None`, not errors.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a profile as a full-document overwrite.
    ///
    /// Used both for the first-sign-in stub and for the wizard's submission,
    /// which rewrites the document rather than merging into it.
    pub async fn set_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Merge a partial update into an existing profile.
    ///
    /// Fetch-modify-write so untouched fields survive. Fails with NotFound
    /// when the document is absent or the questionnaire has never been
    /// completed; this is deliberately not an upsert.
    pub async fn update_profile(
        &self,
        uid: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AppError> {
        let mut profile = self
            .get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", uid)))?;

        let details = profile
            .details
            .as_mut()
            .ok_or_else(|| AppError::NotFound(format!("Profile details for user {}", uid)))?;
        update.apply(details);

        self.set_profile(&profile).await?;
        Ok(profile)
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Get stored Google OAuth tokens for a user.
    pub async fn get_tokens(&self, uid: &str) -> Result<Option<GoogleTokens>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TOKENS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store Google OAuth tokens for a user.
    pub async fn set_tokens(&self, uid: &str, tokens: &GoogleTokens) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TOKENS)
            .document_id(uid)
            .object(tokens)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
