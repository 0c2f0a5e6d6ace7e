//! Rainfall picture feeds: maps a requested date/time window to image URLs.
//!
//! Four feeds are published, each with its own rule for which rows exist and
//! which bulletin (publish anchor) they come from:
//!
//! | Feed | Input | Rows |
//! |---|---|---|
//! | daily actual | `YYYY-MM-DD` | every day in the window up to today |
//! | daily forecast | `YYYY-MM-DD` | every day after the anchor, keyed one day earlier |
//! | hourly forecast | `YYYY-MM-DD HH:MM:SS` | every hour after the anchor, keyed one hour earlier |
//! | hourly actual | `YYYY-MM-DD HH:MM:SS` | every hour in the window |
//!
//! # Clock injection
//! `resolve_at` takes `now` explicitly. `resolve` is the convenience wrapper
//! that reads the local wall clock; tests always go through `resolve_at`.

use crate::config::PictureConfig;
use crate::error::{FetchError, InputError, ResolveError};
use crate::logging::{self, DataSource};
use crate::model::TimeWindowEntry;
use crate::timefmt::{
    days_inclusive, format_date, format_datetime, hours_inclusive, parse_date_window,
    parse_datetime_window, truncate_to_hour,
};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Key separator for the single-row hourly-actual range lookup.
pub const RANGE_KEY_SEPARATOR: &str = "____";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedKind {
    DailyForecast,
    DailyActual,
    HourlyForecast,
    HourlyActual,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Resolves `kind` for the window `[start, end]` as seen at `now`.
pub fn resolve_at(
    kind: FeedKind,
    start: &str,
    end: &str,
    now: NaiveDateTime,
    config: &PictureConfig,
) -> Result<Vec<TimeWindowEntry>, InputError> {
    let entries = match kind {
        FeedKind::DailyActual => {
            let (s, e) = parse_date_window(start, end)?;
            daily_actual(s, e, now.date(), config)
        }
        FeedKind::DailyForecast => {
            let (s, e) = parse_date_window(start, end)?;
            daily_forecast(s, e, now.date(), config)
        }
        FeedKind::HourlyForecast => {
            let (s, e) = parse_datetime_window(start, end)?;
            hourly_forecast(s, e, now, config)
        }
        FeedKind::HourlyActual => {
            let (s, e) = parse_datetime_window(start, end)?;
            hourly_actual(s, e, config)
        }
    };

    logging::debug(
        DataSource::Pictures,
        None,
        &format!("{:?} {}..{}: {} entries", kind, start, end, entries.len()),
    );
    Ok(entries)
}

/// Same as `resolve_at` using the local wall clock.
pub fn resolve(
    kind: FeedKind,
    start: &str,
    end: &str,
    config: &PictureConfig,
) -> Result<Vec<TimeWindowEntry>, InputError> {
    resolve_at(kind, start, end, Local::now().naive_local(), config)
}

// ---------------------------------------------------------------------------
// Feed rules
// ---------------------------------------------------------------------------

/// Observed pictures exist only up to today; each is stamped 09:00.
fn daily_actual(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    config: &PictureConfig,
) -> Vec<TimeWindowEntry> {
    days_inclusive(start, end.min(today))
        .map(|d| TimeWindowEntry {
            key: format_date(d),
            url: format!(
                "{}/{}/{}090000.png",
                config.base_url,
                config.daily_actual_product,
                d.format("%Y%m%d")
            ),
        })
        .collect()
}

/// Forecast pictures come from the bulletin published on the anchor day.
///
/// The anchor is `start` for past windows and today otherwise. The anchor
/// day itself is skipped and each row is keyed one day before its target.
fn daily_forecast(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    config: &PictureConfig,
) -> Vec<TimeWindowEntry> {
    let anchor = if start < today { start } else { today };
    let published = anchor.format("%Y%m%d");

    days_inclusive(anchor, end)
        .filter(|d| *d != anchor)
        .map(|d| TimeWindowEntry {
            key: format_date(d - Duration::days(1)),
            url: format!(
                "{}/{}/{}080000_{}080000.png",
                config.base_url,
                config.daily_forecast_product,
                published,
                d.format("%Y%m%d")
            ),
        })
        .collect()
}

/// Hourly forecast pictures, anchored at `start` for past windows and at one
/// hour before `now` otherwise.
///
/// Keys are one hour before the target hour. When anchored at `now` the key
/// is also truncated to the hour; a user-supplied anchor keeps its minutes
/// and seconds so existing consumers see the same keys as before.
fn hourly_forecast(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
    config: &PictureConfig,
) -> Vec<TimeWindowEntry> {
    let (anchor, now_anchored) = if start < now {
        (start, false)
    } else {
        (now - Duration::hours(1), true)
    };
    let published = truncate_to_hour(anchor).format("%Y%m%d%H");

    hours_inclusive(anchor, end)
        .filter(|h| *h != anchor)
        .map(|h| {
            let key = h - Duration::hours(1);
            let key = if now_anchored { truncate_to_hour(key) } else { key };
            TimeWindowEntry {
                key: format_datetime(key),
                url: format!(
                    "{}/{}/{}0000_{}0000.png",
                    config.base_url,
                    config.hourly_forecast_product,
                    published,
                    truncate_to_hour(h).format("%Y%m%d%H")
                ),
            }
        })
        .collect()
}

/// One rain-summation query per hour of the window; nothing is fetched.
fn hourly_actual(
    start: NaiveDateTime,
    end: NaiveDateTime,
    config: &PictureConfig,
) -> Vec<TimeWindowEntry> {
    hours_inclusive(start, end)
        .map(|h| TimeWindowEntry {
            key: format_datetime(h),
            url: rain_sum_query(&config.rain_sum_url, h, h + Duration::hours(1)),
        })
        .collect()
}

fn rain_sum_query(base: &str, from: NaiveDateTime, to: NaiveDateTime) -> String {
    format!(
        "{}?startTime={}&endTime={}",
        base,
        format_datetime(from).replace(' ', "%20"),
        format_datetime(to).replace(' ', "%20")
    )
}

// ---------------------------------------------------------------------------
// Single-shot range lookup
// ---------------------------------------------------------------------------

/// Asks the rain summation endpoint for one picture covering the whole
/// window and returns it as a single row keyed `"{start}____{end}"`.
///
/// Unlike every other tool, upstream failures here are returned as errors.
pub fn resolve_hourly_actual_range(
    client: &reqwest::blocking::Client,
    config: &PictureConfig,
    start: &str,
    end: &str,
) -> Result<Vec<TimeWindowEntry>, ResolveError> {
    let (s, e) = parse_datetime_window(start, end)?;
    let (s, e) = (format_datetime(s), format_datetime(e));

    let url = fetch_range_picture(client, &config.rain_sum_url, &s, &e).inspect_err(|err| {
        logging::error(
            DataSource::Pictures,
            None,
            &format!("rain summation {}..{} failed: {}", s, e, err),
        )
    })?;

    Ok(vec![TimeWindowEntry {
        key: format!("{}{}{}", s, RANGE_KEY_SEPARATOR, e),
        url,
    }])
}

fn fetch_range_picture(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    start: &str,
    end: &str,
) -> Result<String, FetchError> {
    let response = client
        .get(endpoint)
        .query(&[("startTime", start), ("endTime", end)])
        .send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body: serde_json::Value = serde_json::from_str(&response.text()?)?;
    body.get("data")
        .and_then(|d| d.as_str())
        .map(String::from)
        .ok_or_else(|| FetchError::Payload("response has no string `data` field".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
