// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-form time expressions for the reset command's `--older-than` /
//! `--newer-than` filters.
//!
//! Accepts absolute timestamps (`2024-01-01 12:00:00`, `2024-01-01`,
//! RFC 3339) and relative expressions (`1 hour ago`, `30min ago`, `now`).
//! Relative expressions are resolved against a caller-supplied `now`, so
//! a filter is anchored exactly once.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Parse a time expression into an absolute timestamp, or `None` when
/// the expression is not understood.
pub fn parse_time_expression(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "now" {
        return Some(now);
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    if let Some(duration_part) = raw.strip_suffix("ago") {
        let duration = humantime::parse_duration(duration_part.trim()).ok()?;
        let duration = Duration::from_std(duration).ok()?;
        return now.checked_sub_signed(duration);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn absolute_timestamps_parse() {
        assert_eq!(
            parse_time_expression("2024-01-01 12:00:00", now()),
            Some(ts("2024-01-01 12:00:00"))
        );
        assert_eq!(
            parse_time_expression("2024-01-01T12:00:00", now()),
            Some(ts("2024-01-01 12:00:00"))
        );
        assert_eq!(
            parse_time_expression("2024-02-01", now()),
            Some(ts("2024-02-01 00:00:00"))
        );
    }

    #[test]
    fn relative_expressions_resolve_against_now() {
        assert_eq!(
            parse_time_expression("1 hour ago", now()),
            Some(ts("2024-06-15 11:00:00"))
        );
        assert_eq!(
            parse_time_expression("2 days ago", now()),
            Some(ts("2024-06-13 12:00:00"))
        );
        assert_eq!(
            parse_time_expression("30min ago", now()),
            Some(ts("2024-06-15 11:30:00"))
        );
        assert_eq!(parse_time_expression("now", now()), Some(now()));
    }

    #[test]
    fn nonsense_is_rejected() {
        for bad in ["", "yesterday-ish", "hour ago", "1 fortnight ago", "ago"] {
            assert_eq!(parse_time_expression(bad, now()), None, "{bad}");
        }
    }
}
