//! Inflow tools: one parameterized pipeline behind every table/chart tool.
//!
//! fetch (parallel, per station) → parse → aggregate → render
//!
//! The statistic decides which series are fetched and how they are
//! aggregated and rendered:
//!
//! | Statistic | Series | Output |
//! |---|---|---|
//! | `ByDateTable` | bounds | table + line chart, one row per date/hour |
//! | `SummaryTable` | bounds | table + bar chart of average limits |
//! | `BiasTable` | forecast, actual | table + dual-axis chart of bias |
//! | `BiasMap` | forecast, actual | `{pmis code: {rate, value}}` |

use crate::analysis::groupings::group_bounds_by_key;
use crate::analysis::summary::{bias_summary, bounds_summary};
use crate::error::InputError;
use crate::ingest::{RequestWindow, SeriesSource, fetch_stations};
use crate::model::{BiasSummary, Granularity, SeriesKind, StationSeries};
use crate::render::markdown::{self, whole_cell};
use crate::render::{NO_DATA_SENTINEL, charts, wrap_output};
use crate::stations::{default_daily_stations, default_hourly_stations, pmis_code};
use serde_json::{Map, Value, json};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StatisticKind {
    ByDateTable,
    SummaryTable,
    BiasTable,
    BiasMap,
}

impl StatisticKind {
    fn series_kinds(self) -> &'static [SeriesKind] {
        match self {
            StatisticKind::ByDateTable | StatisticKind::SummaryTable => &[SeriesKind::Bounds],
            StatisticKind::BiasTable | StatisticKind::BiasMap => {
                &[SeriesKind::Forecast, SeriesKind::Actual]
            }
        }
    }
}

/// Arguments shared by every inflow tool.
#[derive(Debug, Clone)]
pub struct InflowRequest {
    pub start: String,
    pub end: String,
    /// Empty means the default roster for the granularity.
    pub stations: Vec<String>,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Tagged Markdown + chart string, or the no-data sentinel.
    Text(String),
    /// Plain mapping.
    Map(Value),
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(text) => write!(f, "{}", text),
            ToolOutput::Map(map) => write!(f, "{:#}", map),
        }
    }
}

/// Runs one inflow tool end to end.
///
/// Only a malformed window is an error; upstream failures show up as `N/A`
/// cells for the affected stations.
pub fn run(
    source: &dyn SeriesSource,
    request: &InflowRequest,
    statistic: StatisticKind,
) -> Result<ToolOutput, InputError> {
    let window = RequestWindow::parse(&request.start, &request.end, request.granularity)?;
    let stations = if request.stations.is_empty() {
        match request.granularity {
            Granularity::Daily => default_daily_stations(),
            Granularity::Hourly => default_hourly_stations(),
        }
    } else {
        request.stations.clone()
    };

    let series = fetch_stations(source, &stations, statistic.series_kinds(), &window);

    Ok(match statistic {
        StatisticKind::ByDateTable => bounds_by_date(&window, &stations, &series),
        StatisticKind::SummaryTable => bounds_overview(&window, &series),
        StatisticKind::BiasTable => bias_table(&window, &series),
        StatisticKind::BiasMap => ToolOutput::Map(bias_map(&series)),
    })
}

fn resolution_label(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Daily => "日级",
        Granularity::Hourly => "小时级",
    }
}

fn bounds_by_date(window: &RequestWindow, stations: &[String], series: &[StationSeries]) -> ToolOutput {
    let grouped = group_bounds_by_key(series);
    if grouped.is_empty() {
        return ToolOutput::Text(NO_DATA_SENTINEL.to_string());
    }

    let title = format!(
        "{}至{}各电站入库流量上下限（{}）",
        window.start,
        window.end,
        resolution_label(window.granularity)
    );
    let table = markdown::bounds_by_key_table(stations, &grouped, window.granularity);
    let chart = charts::bounds_by_key_option(&title, stations, &grouped, window.granularity);
    ToolOutput::Text(wrap_output(&title, &table, &chart))
}

fn bounds_overview(window: &RequestWindow, series: &[StationSeries]) -> ToolOutput {
    let summaries: Vec<_> = series.iter().map(bounds_summary).collect();
    let title = format!(
        "{}至{}各电站入库流量上下限均值（{}）",
        window.start,
        window.end,
        resolution_label(window.granularity)
    );
    let table = markdown::bounds_summary_table(&summaries);
    let chart = charts::bounds_summary_option(&title, &summaries);
    ToolOutput::Text(wrap_output(&title, &table, &chart))
}

fn bias_table(window: &RequestWindow, series: &[StationSeries]) -> ToolOutput {
    let summaries: Vec<BiasSummary> = series.iter().map(bias_summary).collect();
    let title = format!("{}至{}各电站入库流量偏差平均值", window.start, window.end);
    let table = markdown::bias_table(&summaries);
    let chart = charts::station_bias_option(&title, &summaries);
    ToolOutput::Text(wrap_output(&title, &table, &chart))
}

/// PMIS code → `{rate, value}` for every requested station in the registry.
///
/// Each station's numbers come from its own position in `series`. If two
/// requested names share a code, the later one wins.
pub fn bias_map(series: &[StationSeries]) -> Value {
    let mut map = Map::new();
    for station in series {
        let Some(code) = pmis_code(&station.station) else {
            continue;
        };
        let summary = bias_summary(station);
        map.insert(
            code.to_string(),
            json!({
                "rate": charts::percent_value(summary.relative_bias_percent),
                "value": whole_cell(summary.average_absolute_bias),
            }),
        );
    }
    Value::Object(map)
}
