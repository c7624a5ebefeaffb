// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Calendar event model and Google Calendar API wire types.
//!
//! Events are ephemeral: normalized fresh from each API response and never
//! persisted.

use serde::{Deserialize, Serialize};

/// A normalized upcoming event shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    /// Start time (RFC 3339) or, for all-day events, the plain date
    pub start: String,
    /// End time (RFC 3339) or, for all-day events, the plain date
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Normalize one Google Calendar item.
    ///
    /// Returns `None` for items with no resolvable start time.
    pub fn from_api(item: GoogleEvent) -> Option<Self> {
        let start = item.start.and_then(GoogleEventTime::resolve)?;
        // All-day items carry only a date; fall back to it for the end too.
        let end = item
            .end
            .and_then(GoogleEventTime::resolve)
            .unwrap_or_else(|| start.clone());

        Some(Self {
            title: item.summary.unwrap_or_default(),
            start,
            end,
            location: item.location,
            description: item.description,
        })
    }
}

// ─── Google Calendar API response types ──────────────────────

/// Response body of `events.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

/// One item from `events.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEvent {
    pub summary: Option<String>,
    pub start: Option<GoogleEventTime>,
    pub end: Option<GoogleEventTime>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Either a timed (`dateTime`) or all-day (`date`) boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl GoogleEventTime {
    /// Prefer the timed value, falling back to the all-day date.
    pub fn resolve(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_yields_no_events() {
        let list: GoogleEventList = serde_json::from_str(r#"{"kind":"calendar#events"}"#).unwrap();
        let events: Vec<CalendarEvent> = list
            .items
            .into_iter()
            .filter_map(CalendarEvent::from_api)
            .collect();
        assert!(events.is_empty());
    }

    #[test]
    fn test_timed_event_normalization() {
        let list: GoogleEventList = serde_json::from_str(
            r#"{"items":[{
                "summary": "Morning run",
                "start": {"dateTime": "2026-08-06T07:00:00+02:00"},
                "end": {"dateTime": "2026-08-06T08:00:00+02:00"},
                "location": "Park"
            }]}"#,
        )
        .unwrap();

        let events: Vec<CalendarEvent> = list
            .items
            .into_iter()
            .filter_map(CalendarEvent::from_api)
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Morning run");
        assert_eq!(events[0].start, "2026-08-06T07:00:00+02:00");
        assert_eq!(events[0].end, "2026-08-06T08:00:00+02:00");
        assert_eq!(events[0].location.as_deref(), Some("Park"));
        assert!(events[0].description.is_none());
    }

    #[test]
    fn test_all_day_event_falls_back_to_date() {
        let list: GoogleEventList = serde_json::from_str(
            r#"{"items":[{
                "summary": "Race day",
                "start": {"date": "2026-09-01"},
                "end": {"date": "2026-09-02"}
            }]}"#,
        )
        .unwrap();

        let event = CalendarEvent::from_api(list.items.into_iter().next().unwrap()).unwrap();
        assert_eq!(event.start, "2026-09-01");
        assert_eq!(event.end, "2026-09-02");
    }

    #[test]
    fn test_missing_start_is_skipped() {
        let item = GoogleEvent {
            summary: Some("Broken".to_string()),
            start: None,
            end: None,
            location: None,
            description: None,
        };
        assert!(CalendarEvent::from_api(item).is_none());
    }

    #[test]
    fn test_untitled_event_keeps_empty_title() {
        let item = GoogleEvent {
            summary: None,
            start: Some(GoogleEventTime {
                date_time: None,
                date: Some("2026-09-01".to_string()),
            }),
            end: None,
            location: None,
            description: None,
        };
        let event = CalendarEvent::from_api(item).unwrap();
        assert_eq!(event.title, "");
        // No end boundary at all: reuse the start
        assert_eq!(event.end, "2026-09-01");
    }
}
