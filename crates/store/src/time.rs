//! Timestamp handling.
//!
//! All date values are stored as fixed-width RFC 3339 UTC strings with
//! millisecond precision (`2024-03-15T10:00:00.000Z`). Fixed width means
//! lexicographic order equals chronological order, so both backends can
//! filter date ranges with plain string comparison.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// The current instant in canonical form.
pub fn now() -> String {
    Utc::now().format(FORMAT).to_string()
}

/// An instant a number of days from now, in canonical form.
pub fn days_from_now(days: i64) -> String {
    (Utc::now() + chrono::Duration::days(days))
        .format(FORMAT)
        .to_string()
}

/// Normalizes an incoming date string to canonical form.
///
/// Accepts full RFC 3339 timestamps (any offset), bare `YYYY-MM-DD` dates
/// (midnight UTC) and naive `YYYY-MM-DDTHH:MM:SS` timestamps (assumed UTC).
/// Returns `None` when the value does not parse.
pub fn normalize(value: &str) -> Option<String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc).format(FORMAT).to_string());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.and_utc().format(FORMAT).to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(
            date.and_hms_opt(0, 0, 0)?
                .and_utc()
                .format(FORMAT)
                .to_string(),
        );
    }
    None
}

/// Inclusive lower bound for a range starting on the given day.
pub fn start_of_day(date: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc().format(FORMAT).to_string())
}

/// Inclusive upper bound for a range ending on the given day.
pub fn end_of_day(date: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d").ok()?;
    Some(
        day.and_hms_milli_opt(23, 59, 59, 999)?
            .and_utc()
            .format(FORMAT)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_date() {
        assert_eq!(
            normalize("2024-03-15").as_deref(),
            Some("2024-03-15T00:00:00.000Z")
        );
    }

    #[test]
    fn test_normalize_rfc3339_with_offset() {
        assert_eq!(
            normalize("2024-03-15T09:00:00+09:00").as_deref(),
            Some("2024-03-15T00:00:00.000Z")
        );
    }

    #[test]
    fn test_normalize_naive_timestamp() {
        assert_eq!(
            normalize("2024-03-15T10:30:00").as_deref(),
            Some("2024-03-15T10:30:00.000Z")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize("soon"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_day_bounds() {
        assert_eq!(
            start_of_day("2024-03-15").as_deref(),
            Some("2024-03-15T00:00:00.000Z")
        );
        assert_eq!(
            end_of_day("2024-03-15").as_deref(),
            Some("2024-03-15T23:59:59.999Z")
        );
        // bounds accept already-normalized timestamps too
        assert_eq!(
            end_of_day("2024-03-15T10:00:00.000Z").as_deref(),
            Some("2024-03-15T23:59:59.999Z")
        );
    }

    #[test]
    fn test_now_is_canonical_width() {
        let ts = now();
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert!(normalize(&ts).is_some());
    }
}
