/// Core data types for the inflow data tools.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small accessors, no I/O, and no external
/// dependencies other than serde for the output shapes.
///
/// Everything here is request-scoped: built fresh at the start of a tool
/// invocation, filled during a single pass over the fetched data, and dropped
/// once the response is rendered.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Granularity and series kinds
// ---------------------------------------------------------------------------

/// Time resolution of a request: one row per calendar day or per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Hourly,
}

impl Granularity {
    /// Infix used in mock file names (`龚嘴日上下限.json`, `龚嘴小时上下限.json`).
    pub fn file_infix(self) -> &'static str {
        match self {
            Granularity::Daily => "日",
            Granularity::Hourly => "小时",
        }
    }

    /// Workflow `type` value for forecast/actual series at this resolution.
    pub fn series_type(self) -> &'static str {
        match self {
            Granularity::Daily => "逐日",
            Granularity::Hourly => "逐小时",
        }
    }
}

/// Which series is being requested for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Forecast inflow (`预报`).
    Forecast,
    /// Observed inflow (`实测`).
    Actual,
    /// Probabilistic forecast envelope, Q95/Q5 (`上下限`).
    Bounds,
}

impl SeriesKind {
    /// Workflow `dataType` value.
    pub fn data_type(self) -> &'static str {
        match self {
            SeriesKind::Forecast | SeriesKind::Bounds => "预报",
            SeriesKind::Actual => "实测",
        }
    }

    /// Suffix used in mock file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            SeriesKind::Forecast => "预报",
            SeriesKind::Actual => "实测",
            SeriesKind::Bounds => "上下限",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Forecast => write!(f, "forecast"),
            SeriesKind::Actual => write!(f, "actual"),
            SeriesKind::Bounds => write!(f, "bounds"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single inflow value keyed by its truncated timestamp.
///
/// `key` is `YYYY-MM-DD` for daily series and `YYYY-MM-DD HH:00:00` for
/// hourly series. `value` has already been rounded to a whole m³/s.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub key: String,
    pub value: f64,
}

/// Upper/lower limit of the probabilistic inflow forecast, in m³/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundPair {
    pub up: f64,
    pub down: f64,
}

/// A bound pair keyed by its truncated timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPoint {
    pub key: String,
    pub bounds: BoundPair,
}

/// All series fetched for one station in one request.
///
/// `None` means the station contributed no usable data (fetch failure,
/// missing file, or a malformed payload). Downstream statistics for such a
/// station are all `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationSeries {
    pub station: String,
    pub forecast: Option<Vec<TimeSeriesPoint>>,
    pub actual: Option<Vec<TimeSeriesPoint>>,
    pub bounds: Option<Vec<BoundPoint>>,
}

impl StationSeries {
    pub fn new(station: &str) -> Self {
        Self {
            station: station.to_string(),
            ..Self::default()
        }
    }
}

/// Key → value map built from a series; later duplicates overwrite earlier
/// ones, as a dict comprehension over the records would.
pub fn keyed_values(points: &[TimeSeriesPoint]) -> BTreeMap<&str, f64> {
    points.iter().map(|p| (p.key.as_str(), p.value)).collect()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Forecast-vs-actual bias for one station over the dates both series share.
///
/// Every field is `None` when the intersection is empty; `relative_bias_percent`
/// is additionally `None` when the actual baseline is zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BiasSummary {
    pub station: String,
    pub average_absolute_bias: Option<f64>,
    pub average_actual_value: Option<f64>,
    pub relative_bias_percent: Option<f64>,
}

/// Mean upper and lower limit for one station over its own series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsSummary {
    pub station: String,
    pub average_up: Option<f64>,
    pub average_down: Option<f64>,
}

// ---------------------------------------------------------------------------
// Time-window entries
// ---------------------------------------------------------------------------

/// One resolved row of a picture feed: logical date/time → image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindowEntry {
    pub key: String,
    pub url: String,
}

/// Collapses resolved entries into the mapping returned to the caller.
///
/// Keys are date or datetime strings, so lexical order is chronological.
pub fn entries_to_map(entries: &[TimeWindowEntry]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|e| (e.key.clone(), e.url.clone()))
        .collect()
}
