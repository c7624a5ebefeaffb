// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Questionnaire step definitions.
//!
//! The wizard core is data-driven: it only knows how to render one step
//! definition at a time. The concrete field schema lives here as
//! configuration, not control flow.

use crate::time_utils::format_pace;
use serde::{Deserialize, Serialize};

/// One question presented by the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The input surface a step renders.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuestionKind {
    Slider {
        min: f64,
        max: f64,
        step: f64,
        #[serde(skip)]
        default: f64,
        #[serde(skip)]
        format: SliderFormat,
    },
    Select {
        options: &'static [&'static str],
    },
    Text,
}

/// How a slider's numeric value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderFormat {
    Plain,
    /// Seconds rendered as "m:ss" (running pace)
    MinutesSeconds,
}

/// One collected answer. Sliders produce numbers; selects and free-text
/// steps produce strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    /// An empty string is the only empty answer; numbers always count.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Number(_) => false,
            Answer::Text(s) => s.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) => Some(*n),
            Answer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Number(_) => None,
            Answer::Text(s) => Some(s),
        }
    }

    /// The formatted value displayed next to the input surface.
    pub fn display(&self, kind: &QuestionKind) -> String {
        match (self, kind) {
            (
                Answer::Number(n),
                QuestionKind::Slider {
                    format: SliderFormat::MinutesSeconds,
                    ..
                },
            ) => format_pace(n.round() as u32),
            (Answer::Number(n), _) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            (Answer::Text(s), _) => s.clone(),
        }
    }
}

/// Weight goal defaults to five kilograms below the entered weight.
///
/// Carried over from the original product behavior: changing the weight
/// answer recomputes the weight goal in the same update.
pub const WEIGHT_GOAL_OFFSET_KG: f64 = 5.0;

pub fn weight_goal_for(weight_kg: f64) -> f64 {
    weight_kg - WEIGHT_GOAL_OFFSET_KG
}

/// The nine-step personal-details questionnaire.
pub const QUESTIONS: &[Question] = &[
    Question {
        name: "height",
        label: "Height (cm)",
        kind: QuestionKind::Slider {
            min: 100.0,
            max: 250.0,
            step: 1.0,
            default: 170.0,
            format: SliderFormat::Plain,
        },
    },
    Question {
        name: "weight",
        label: "Weight (kg)",
        kind: QuestionKind::Slider {
            min: 30.0,
            max: 200.0,
            step: 1.0,
            default: 70.0,
            format: SliderFormat::Plain,
        },
    },
    Question {
        name: "age",
        label: "Age",
        kind: QuestionKind::Slider {
            min: 18.0,
            max: 100.0,
            step: 1.0,
            default: 25.0,
            format: SliderFormat::Plain,
        },
    },
    Question {
        name: "gender",
        label: "Gender",
        kind: QuestionKind::Select {
            options: &["male", "female"],
        },
    },
    Question {
        name: "weeklyRunFrequency",
        label: "Weekly Run Frequency",
        kind: QuestionKind::Select {
            options: &["0", "1-2", "3+"],
        },
    },
    Question {
        name: "runningPace",
        label: "Running Pace (min/km)",
        // Values in seconds per km
        kind: QuestionKind::Slider {
            min: 180.0,
            max: 480.0,
            step: 10.0,
            default: 180.0,
            format: SliderFormat::MinutesSeconds,
        },
    },
    Question {
        name: "exerciseTime",
        label: "Preferred Exercise Time",
        kind: QuestionKind::Select {
            options: &["morning", "noon", "afternoon", "evening"],
        },
    },
    Question {
        name: "coffeeIntake",
        label: "Coffee Intake",
        kind: QuestionKind::Select {
            options: &["0", "1-2", "3-5", "5+"],
        },
    },
    Question {
        name: "weightGoal",
        label: "Weight Goal (kg)",
        kind: QuestionKind::Slider {
            min: 30.0,
            max: 200.0,
            step: 1.0,
            // Five below the default weight, per the weight-goal rule
            default: 65.0,
            format: SliderFormat::Plain,
        },
    },
];
