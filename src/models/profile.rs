//! User profile model for storage and API.
//!
//! Field names are serialized camelCase to match the `users` collection
//! documents written by earlier versions of the app.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore, one document per uid.
///
/// The questionnaire details are all-or-nothing: a freshly signed-in user has
/// only the identity metadata, and the wizard's submission rewrites the
/// document with the full detail set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identity-provider uid (also used as document ID)
    pub uid: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name from the identity provider
    pub display_name: Option<String>,
    /// Profile picture URL
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// When the document was (re)created (RFC 3339)
    pub created_at: String,
    /// Questionnaire answers; absent until the wizard has been submitted
    #[serde(flatten)]
    pub details: Option<ProfileDetails>,
}

impl UserProfile {
    /// Stub document written on first sign-in, before the wizard runs.
    pub fn stub(
        uid: String,
        email: Option<String>,
        display_name: Option<String>,
        photo_url: Option<String>,
        created_at: String,
    ) -> Self {
        Self {
            uid,
            email,
            display_name,
            photo_url,
            created_at,
            details: None,
        }
    }

    /// Whether the questionnaire has been completed.
    pub fn is_complete(&self) -> bool {
        self.details.is_some()
    }
}

/// Questionnaire answers held by a complete profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Age in years
    pub age: u32,
    pub gender: Gender,
    pub weekly_run_frequency: RunFrequency,
    /// Running pace in seconds per kilometer (displayed as m:ss)
    pub running_pace: u32,
    pub exercise_time: ExerciseTime,
    pub coffee_intake: CoffeeIntake,
    /// Target weight in kilograms
    pub weight_goal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Runs per week, bucketed the way the questionnaire asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunFrequency {
    #[serde(rename = "0")]
    None,
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "3+")]
    ThreePlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseTime {
    Morning,
    Noon,
    Afternoon,
    Evening,
}

/// Cups of coffee per day, bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoffeeIntake {
    #[serde(rename = "0")]
    None,
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "5+")]
    FivePlus,
}

/// Partial update applied from the profile-editing view.
///
/// Only detail fields can be edited; identity metadata is owned by the
/// sign-in flow. Merge semantics: absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weekly_run_frequency: Option<RunFrequency>,
    pub running_pace: Option<u32>,
    pub exercise_time: Option<ExerciseTime>,
    pub coffee_intake: Option<CoffeeIntake>,
    pub weight_goal: Option<f64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.height.is_none()
            && self.weight.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.weekly_run_frequency.is_none()
            && self.running_pace.is_none()
            && self.exercise_time.is_none()
            && self.coffee_intake.is_none()
            && self.weight_goal.is_none()
    }

    /// Merge the set fields into existing details.
    pub fn apply(&self, details: &mut ProfileDetails) {
        if let Some(v) = self.height {
            details.height = v;
        }
        if let Some(v) = self.weight {
            details.weight = v;
        }
        if let Some(v) = self.age {
            details.age = v;
        }
        if let Some(v) = self.gender {
            details.gender = v;
        }
        if let Some(v) = self.weekly_run_frequency {
            details.weekly_run_frequency = v;
        }
        if let Some(v) = self.running_pace {
            details.running_pace = v;
        }
        if let Some(v) = self.exercise_time {
            details.exercise_time = v;
        }
        if let Some(v) = self.coffee_intake {
            details.coffee_intake = v;
        }
        if let Some(v) = self.weight_goal {
            details.weight_goal = v;
        }
    }
}

/// User's Google OAuth tokens stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokens {
    /// OAuth access token
    pub access_token: String,
    /// Refresh token; Google only issues one on the initial consent
    pub refresh_token: Option<String>,
    /// When the access token expires (ISO 8601)
    pub expires_at: String,
    /// Granted OAuth scopes
    pub scopes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ProfileDetails {
        ProfileDetails {
            height: 170.0,
            weight: 70.0,
            age: 25,
            gender: Gender::Male,
            weekly_run_frequency: RunFrequency::OneToTwo,
            running_pace: 300,
            exercise_time: ExerciseTime::Morning,
            coffee_intake: CoffeeIntake::ThreeToFive,
            weight_goal: 65.0,
        }
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile {
            uid: "u1".to_string(),
            email: Some("a@b.c".to_string()),
            display_name: Some("A B".to_string()),
            photo_url: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            details: Some(details()),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "A B");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["weeklyRunFrequency"], "1-2");
        assert_eq!(json["runningPace"], 300);
        assert_eq!(json["coffeeIntake"], "3-5");
        assert_eq!(json["gender"], "male");
    }

    #[test]
    fn test_stub_round_trip_has_no_details() {
        let stub = UserProfile::stub(
            "u1".to_string(),
            Some("a@b.c".to_string()),
            None,
            None,
            "2026-01-01T00:00:00Z".to_string(),
        );
        assert!(!stub.is_complete());

        let json = serde_json::to_string(&stub).unwrap();
        let parsed: UserProfile = serde_json::from_str(&json).unwrap();
        assert!(parsed.details.is_none());
        assert_eq!(parsed.uid, "u1");
    }

    #[test]
    fn test_update_merges_only_set_fields() {
        let mut d = details();
        let update = ProfileUpdate {
            weight: Some(80.0),
            exercise_time: Some(ExerciseTime::Evening),
            ..Default::default()
        };
        update.apply(&mut d);

        assert_eq!(d.weight, 80.0);
        assert_eq!(d.exercise_time, ExerciseTime::Evening);
        // Untouched fields keep their values
        assert_eq!(d.height, 170.0);
        assert_eq!(d.weight_goal, 65.0);
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let err = serde_json::from_str::<ProfileUpdate>(r#"{"uid":"nope"}"#);
        assert!(err.is_err());
    }
}
