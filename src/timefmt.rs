//! Strict date/time parsing and calendar iteration.
//!
//! chrono's `%Y`/`%m` accept variable-width fields, so the layout is checked
//! character by character before parsing; `2025-8-5` and `2025/08/05` are
//! both rejected with the input echoed back.

use crate::error::InputError;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";
pub const DATETIME_LAYOUT: &str = "YYYY-MM-DD HH:MM:SS";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `true` if `input` has a digit wherever `layout` has a letter and the same
/// punctuation everywhere else.
fn matches_layout(input: &str, layout: &str) -> bool {
    input.len() == layout.len()
        && input.bytes().zip(layout.bytes()).all(|(c, l)| {
            if l.is_ascii_alphabetic() {
                c.is_ascii_digit()
            } else {
                c == l
            }
        })
}

/// Parses exactly `YYYY-MM-DD` (surrounding whitespace ignored).
pub fn parse_date(input: &str) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();
    let err = || InputError::Format {
        input: input.to_string(),
        expected: DATE_LAYOUT,
    };
    if !matches_layout(trimmed, DATE_LAYOUT) {
        return Err(err());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| err())
}

/// Parses exactly `YYYY-MM-DD HH:MM:SS` (surrounding whitespace ignored).
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, InputError> {
    let trimmed = input.trim();
    let err = || InputError::Format {
        input: input.to_string(),
        expected: DATETIME_LAYOUT,
    };
    if !matches_layout(trimmed, DATETIME_LAYOUT) {
        return Err(err());
    }
    NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT).map_err(|_| err())
}

/// Parses a daily window and checks `start <= end`.
pub fn parse_date_window(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), InputError> {
    let s = parse_date(start)?;
    let e = parse_date(end)?;
    if s > e {
        return Err(InputError::Ordering {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok((s, e))
}

/// Parses an hourly window and checks `start <= end`.
pub fn parse_datetime_window(
    start: &str,
    end: &str,
) -> Result<(NaiveDateTime, NaiveDateTime), InputError> {
    let s = parse_datetime(start)?;
    let e = parse_datetime(end)?;
    if s > e {
        return Err(InputError::Ordering {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok((s, e))
}

/// Every day from `start` to `end` inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// `start`, `start + 1h`, ... while `<= end`.
pub fn hours_inclusive(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> impl Iterator<Item = NaiveDateTime> {
    std::iter::successors(Some(start), |h| h.checked_add_signed(Duration::hours(1)))
        .take_while(move |h| *h <= end)
}

/// Zeroes minutes, seconds and sub-seconds.
pub fn truncate_to_hour(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date()
        .and_hms_opt(dt.hour(), 0, 0)
        .unwrap_or(dt)
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}
