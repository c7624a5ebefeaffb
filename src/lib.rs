// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! FitNutrition: fitness and nutrition profiles with calendar integration.
//!
//! This crate provides the backend API for the questionnaire wizard,
//! stored user profiles, and Google Calendar event retrieval.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CalendarService, WizardService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub calendar_service: CalendarService,
    pub wizard_service: WizardService,
}
