// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Fractional seconds are kept only when present.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Format a timestamp for the admin tables (`dd.mm.yyyy HH:MM:SS`, UTC).
pub fn format_display(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%Y %H:%M:%S").to_string()
}

/// Read a stored timestamp value.
///
/// Accepts RFC3339 strings and `{seconds, nanos}` maps (with or without the
/// leading underscore some SDKs emit). Anything else is `None`.
pub fn parse_stored_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanos")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_rfc3339_string() {
        let parsed = parse_stored_timestamp(&json!("2025-03-01T09:30:00+03:00")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_seconds_map() {
        let parsed = parse_stored_timestamp(&json!({"_seconds": 1_700_000_000, "_nanoseconds": 0}));
        assert_eq!(parsed, DateTime::from_timestamp(1_700_000_000, 0));
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert_eq!(parse_stored_timestamp(&json!(null)), None);
        assert_eq!(parse_stored_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_stored_timestamp(&json!(12)), None);
    }

    #[test]
    fn test_format_display() {
        let date = Utc.with_ymd_and_hms(2024, 12, 5, 7, 8, 9).unwrap();
        assert_eq!(format_display(date), "05.12.2024 07:08:09");
        assert_eq!(format_utc_rfc3339(date), "2024-12-05T07:08:09Z");
    }
}
