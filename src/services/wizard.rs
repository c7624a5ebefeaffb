// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Questionnaire wizard: a linear, single-active-step form state machine.
//!
//! One question is visible at a time; a step must be answered before the
//! wizard advances, and submission rewrites the profile document in full.
//! State lives in memory per user and is discarded once a submission lands.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::questionnaire::{weight_goal_for, Answer, Question, QuestionKind, QUESTIONS};
use crate::models::{ProfileDetails, UserProfile};
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const ANSWER_REQUIRED: &str = "Please answer the question before moving on.";
pub const ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const SUBMIT_SUCCESS: &str = "Your profile has been successfully submitted!";
pub const SUBMIT_FAILED: &str = "Failed to save data. Please try again.";

/// Where a successful submission sends the user.
pub const DASHBOARD_ROUTE: &str = "/dashboard";
/// How long the success message is shown before the redirect.
pub const REDIRECT_DELAY_MS: u64 = 2000;

/// In-memory wizard state for one user.
#[derive(Debug, Clone)]
pub struct WizardState {
    questions: &'static [Question],
    pub step: usize,
    pub answers: HashMap<&'static str, Answer>,
    pub error: Option<String>,
    pub submitting: bool,
    pub success: Option<String>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::with_questions(QUESTIONS)
    }

    /// Build state over an arbitrary question list. Sliders start at their
    /// declared default; selects and text steps start unanswered.
    pub fn with_questions(questions: &'static [Question]) -> Self {
        let mut answers = HashMap::new();
        for q in questions {
            if let QuestionKind::Slider { default, .. } = q.kind {
                answers.insert(q.name, Answer::Number(default));
            }
        }

        Self {
            questions,
            step: 0,
            answers,
            error: None,
            submitting: false,
            success: None,
        }
    }

    pub fn current_question(&self) -> &'static Question {
        &self.questions[self.step]
    }

    fn answer_is_empty(&self, name: &str) -> bool {
        self.answers.get(name).map_or(true, Answer::is_empty)
    }

    /// First question with no usable answer, in step order.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        self.questions
            .iter()
            .find(|q| self.answer_is_empty(q.name))
            .map(|q| q.name)
    }

    /// Overwrite the value for `field`.
    ///
    /// No validation happens at write time, with one exception carried from
    /// the product rule set: changing the weight also recomputes the weight
    /// goal to five kilograms less, in the same update.
    pub fn set_answer(&mut self, field: &str, value: Answer) -> Result<(), AppError> {
        let question = self
            .questions
            .iter()
            .find(|q| q.name == field)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown field: {}", field)))?;

        if question.name == "weight" {
            let weight = match &value {
                Answer::Number(n) => Some(*n),
                Answer::Text(s) => s.parse::<f64>().ok(),
            };
            if let Some(w) = weight {
                self.answers
                    .insert("weightGoal", Answer::Number(weight_goal_for(w)));
            }
        }

        self.answers.insert(question.name, value);
        Ok(())
    }

    /// Move to the next step if the current one is answered.
    pub fn advance(&mut self) {
        if self.answer_is_empty(self.current_question().name) {
            self.error = Some(ANSWER_REQUIRED.to_string());
            return;
        }
        self.error = None;
        self.step = (self.step + 1).min(self.questions.len() - 1);
    }

    /// Move back one step; never underflows.
    pub fn retreat(&mut self) {
        self.error = None;
        self.step = self.step.saturating_sub(1);
    }

    /// Render the single active step: one input surface, one formatted value.
    pub fn view(&self) -> WizardView {
        self.view_inner(None)
    }

    fn view_with_redirect(&self) -> WizardView {
        self.view_inner(Some(RedirectInfo {
            to: DASHBOARD_ROUTE,
            after_ms: REDIRECT_DELAY_MS,
        }))
    }

    fn view_inner(&self, redirect: Option<RedirectInfo>) -> WizardView {
        let question = self.current_question();
        let value = self.answers.get(question.name).cloned();
        let display_value = value
            .as_ref()
            .map(|v| v.display(&question.kind))
            .unwrap_or_default();

        WizardView {
            step: self.step,
            total_steps: self.questions.len(),
            question,
            value,
            display_value,
            error: self.error.clone(),
            submitting: self.submitting,
            success: self.success.clone(),
            redirect,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the frontend renders for the active step.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: usize,
    pub total_steps: usize,
    pub question: &'static Question,
    pub value: Option<Answer>,
    pub display_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectInfo>,
}

/// Navigation the frontend performs after the given delay.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectInfo {
    pub to: &'static str,
    pub after_ms: u64,
}

/// Per-user wizard sessions.
pub type WizardSessions = Arc<DashMap<String, WizardState>>;

/// Wizard session service: owns per-user state and the submission write.
#[derive(Clone)]
pub struct WizardService {
    sessions: WizardSessions,
    db: FirestoreDb,
}

impl WizardService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            db,
        }
    }

    fn with_session<R>(&self, uid: &str, f: impl FnOnce(&mut WizardState) -> R) -> R {
        let mut entry = self
            .sessions
            .entry(uid.to_string())
            .or_insert_with(WizardState::new);
        f(entry.value_mut())
    }

    pub fn view(&self, uid: &str) -> WizardView {
        self.with_session(uid, |s| s.view())
    }

    pub fn set_answer(&self, uid: &str, field: &str, value: Answer) -> Result<WizardView, AppError> {
        self.with_session(uid, |s| {
            s.set_answer(field, value)?;
            Ok(s.view())
        })
    }

    pub fn advance(&self, uid: &str) -> WizardView {
        self.with_session(uid, |s| {
            s.advance();
            s.view()
        })
    }

    pub fn retreat(&self, uid: &str) -> WizardView {
        self.with_session(uid, |s| {
            s.retreat();
            s.view()
        })
    }

    /// Submit the questionnaire: one full-document profile write.
    ///
    /// Guard order matters: an in-flight submission short-circuits, then the
    /// required-field check runs before the store is touched at all. A failed
    /// write is terminal for the attempt; the user resubmits explicitly.
    pub async fn submit(&self, user: &AuthUser) -> Result<WizardView, AppError> {
        // Validate and mark in-flight while holding the session entry.
        let profile = {
            let mut entry = self
                .sessions
                .entry(user.uid.clone())
                .or_insert_with(WizardState::new);
            let session = entry.value_mut();

            if session.submitting {
                return Ok(session.view());
            }

            session.error = None;
            session.success = None;

            if session.first_empty_field().is_some() {
                session.error = Some(ALL_FIELDS_REQUIRED.to_string());
                return Ok(session.view());
            }

            let created_at = format_utc_rfc3339(Utc::now());
            let profile = match build_profile(user, &session.answers, created_at) {
                Ok(profile) => profile,
                Err(AppError::Validation(msg)) => {
                    session.error = Some(msg);
                    return Ok(session.view());
                }
                Err(e) => return Err(e),
            };

            session.submitting = true;
            profile
        };

        // Exactly one write, outside the session entry.
        let result = self.db.set_profile(&profile).await;

        match result {
            Ok(()) => {
                tracing::info!(uid = %user.uid, "Questionnaire submitted");
                let view = self.with_session(&user.uid, |session| {
                    session.submitting = false;
                    session.success = Some(SUBMIT_SUCCESS.to_string());
                    session.view_with_redirect()
                });
                // The wizard's job is done; drop the session state.
                self.sessions.remove(&user.uid);
                Ok(view)
            }
            Err(e) => {
                tracing::warn!(uid = %user.uid, error = %e, "Questionnaire submission failed");
                Ok(self.with_session(&user.uid, |session| {
                    session.submitting = false;
                    session.error = Some(SUBMIT_FAILED.to_string());
                    session.view()
                }))
            }
        }
    }
}

/// Build the full profile document from the answer map.
///
/// The payload is the complete answer set plus the identity's email and
/// display name and a fresh creation timestamp; any previous document
/// contents (including the photo URL from the sign-in stub) are replaced.
fn build_profile(
    user: &AuthUser,
    answers: &HashMap<&'static str, Answer>,
    created_at: String,
) -> Result<UserProfile, AppError> {
    let details = ProfileDetails {
        height: number(answers, "height")?,
        weight: number(answers, "weight")?,
        age: number(answers, "age")?.round() as u32,
        gender: choice(answers, "gender")?,
        weekly_run_frequency: choice(answers, "weeklyRunFrequency")?,
        running_pace: number(answers, "runningPace")?.round() as u32,
        exercise_time: choice(answers, "exerciseTime")?,
        coffee_intake: choice(answers, "coffeeIntake")?,
        weight_goal: number(answers, "weightGoal")?,
    };

    Ok(UserProfile {
        uid: user.uid.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        photo_url: None,
        created_at,
        details: Some(details),
    })
}

fn invalid(field: &str) -> AppError {
    AppError::Validation(format!("Invalid value for {}", field))
}

fn number(answers: &HashMap<&'static str, Answer>, field: &str) -> Result<f64, AppError> {
    match answers.get(field) {
        Some(Answer::Number(n)) => Ok(*n),
        Some(Answer::Text(s)) => s.parse().map_err(|_| invalid(field)),
        None => Err(invalid(field)),
    }
}

/// Parse a select answer through the same serde names the profile model uses.
fn choice<T: serde::de::DeserializeOwned>(
    answers: &HashMap<&'static str, Answer>,
    field: &str,
) -> Result<T, AppError> {
    let text = answers
        .get(field)
        .and_then(Answer::as_text)
        .ok_or_else(|| invalid(field))?;
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|_| invalid(field))
}
