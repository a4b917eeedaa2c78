//! Lazy date coercion.
//!
//! Strings are only ever interpreted as dates when a date-aware operator
//! demands it — parsing eagerly on every string would pay the cost on plain
//! string equality for expressions that never touch a date at all.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::{DilemmaError, Result};
use crate::model::value::Value;
use crate::span::Span;

/// The evaluator's notion of "now", captured once per top-level evaluation
/// call so every `$now`/`$today` within one call observes the same instant.
#[derive(Debug, Clone, Copy)]
pub struct Now(pub DateTime<Utc>);

impl Now {
    /// Capture the current wall-clock instant.
    pub fn capture() -> Self {
        Now(Utc::now())
    }

    /// A fixed instant, for deterministic tests.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Now(instant)
    }

    /// Midnight UTC of the current day, used by `$today`.
    pub fn today_midnight(self) -> DateTime<Utc> {
        self.0
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc()
    }
}

/// Coerce a value to an instant, for use by a date-aware operator.
///
/// Supported forms: ISO 8601 with or without offset (`Z` means
/// UTC), `YYYY-MM-DD HH:MM:SS UTC`, bare `YYYY-MM-DD` (midnight UTC), and
/// numeric Unix seconds. A [`Value::DateTime`] coerces to itself. Anything
/// else (or a string that fails every format) is a type error for the
/// calling operator.
pub fn coerce_to_instant(value: &Value, span: Span) -> Result<DateTime<Utc>> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Int(seconds) => Ok(Utc.timestamp_opt(*seconds, 0).single().ok_or_else(|| {
            DilemmaError::type_error(format!("'{seconds}' is not a valid Unix timestamp"), span)
        })?),
        Value::Float(seconds) => {
            let whole = seconds.trunc() as i64;
            let nanos = ((seconds.fract()) * 1_000_000_000.0).round() as u32;
            Ok(Utc
                .timestamp_opt(whole, nanos)
                .single()
                .ok_or_else(|| {
                    DilemmaError::type_error(
                        format!("'{seconds}' is not a valid Unix timestamp"),
                        span,
                    )
                })?)
        }
        Value::Str(s) => parse_date_string(s, span),
        other => {
            log::trace!("date coercion failed: {} is not date-like", other.kind_name());
            Err(DilemmaError::type_error(
                format!("cannot interpret a {} as a date", other.kind_name()),
                span,
            ))
        }
    }
}

fn parse_date_string(s: &str, span: Span) -> Result<DateTime<Utc>> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(rest) = trimmed.strip_suffix(" UTC") {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(rest, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc());
    }

    if let Ok(seconds) = trimmed.parse::<i64>() {
        if let Some(dt) = Utc.timestamp_opt(seconds, 0).single() {
            return Ok(dt);
        }
    }

    log::trace!("date coercion failed: '{trimmed}' matched no supported date format");
    Err(DilemmaError::type_error(
        format!("'{trimmed}' is not a recognized date/time format"),
        span,
    ))
}

/// Whether two instants fall on the same UTC calendar day.
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let span = Span::new(0, 0);
        let dt = coerce_to_instant(&Value::string("2024-01-15"), span).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn parses_space_separated_utc_form() {
        let span = Span::new(0, 0);
        let dt = coerce_to_instant(&Value::string("2024-01-15 13:30:00 UTC"), span).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T13:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let span = Span::new(0, 0);
        let dt = coerce_to_instant(&Value::string("2024-01-15T08:30:00-05:00"), span).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T13:30:00+00:00");
    }

    #[test]
    fn parses_unix_seconds() {
        let span = Span::new(0, 0);
        let dt = coerce_to_instant(&Value::Int(0), span).unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_unparseable_string() {
        let span = Span::new(0, 0);
        assert!(coerce_to_instant(&Value::string("not a date"), span).is_err());
    }

    #[test]
    fn same_calendar_day_ignores_time_of_day() {
        let a = coerce_to_instant(&Value::string("2024-01-15T01:00:00Z"), Span::new(0, 0)).unwrap();
        let b = coerce_to_instant(&Value::string("2024-01-15T23:00:00Z"), Span::new(0, 0)).unwrap();
        assert!(same_calendar_day(a, b));
    }
}
