// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Data models for the application.

pub mod event;
pub mod profile;
pub mod questionnaire;

pub use event::CalendarEvent;
pub use profile::{GoogleTokens, ProfileDetails, ProfileUpdate, UserProfile};
pub use questionnaire::{Answer, Question, QuestionKind};
