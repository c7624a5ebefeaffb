// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Services module - business logic layer.

pub mod calendar;
pub mod wizard;

pub use calendar::{CalendarService, OAuthResult};
pub use wizard::{WizardService, WizardView};
