// SPDX-License-Identifier: MIT
// Copyright 2026 FitNutrition Developers

//! Shared helpers for date/time and pace formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a running pace in seconds-per-km as "m:ss".
pub fn format_pace(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(180), "3:00");
        assert_eq!(format_pace(305), "5:05");
        assert_eq!(format_pace(479), "7:59");
        assert_eq!(format_pace(59), "0:59");
    }
}
