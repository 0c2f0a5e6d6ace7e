//! Markdown tables for the inflow tools.
//!
//! Missing statistics always render as `N/A`; flows are whole m³/s and
//! percentages carry one decimal.

use crate::analysis::groupings::{BoundsByKey, cell};
use crate::analysis::round_whole;
use crate::model::{BiasSummary, BoundsSummary, Granularity};

pub const NOT_AVAILABLE: &str = "N/A";

pub const BIAS_ROW_LABEL: &str = "绝对平均偏差(m³/s)";
pub const PERCENT_ROW_LABEL: &str = "相对平均偏差(%)";
pub const UP_AVERAGE_LABEL: &str = "上限均值(m³/s)";
pub const DOWN_AVERAGE_LABEL: &str = "下限均值(m³/s)";

/// `| a | b |` header, a separator row made of `separator` cells, then rows.
pub fn render_table(headers: &[String], separator: &str, rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!("|{}|", vec![separator; headers.len()].join("|")));
    for row in rows {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines.join("\n")
}

/// Whole-number cell.
pub fn whole_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", round_whole(v) as i64),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// One-decimal cell.
pub fn percent_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Row label for a grouping key: dates as-is, hours as `YYYY-MM-DD HH:00`.
pub fn display_key(key: &str, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => key.to_string(),
        Granularity::Hourly => format!("{}:00", key.get(..13).unwrap_or(key)),
    }
}

/// One row per key, an upper and a lower column per station.
pub fn bounds_by_key_table(
    stations: &[String],
    grouped: &BoundsByKey,
    granularity: Granularity,
) -> String {
    let mut headers = vec!["时间".to_string()];
    for station in stations {
        headers.push(format!("{}上限m3/s", station));
        headers.push(format!("{}下限m3/s", station));
    }

    let rows: Vec<Vec<String>> = grouped
        .keys()
        .map(|key| {
            let mut row = vec![display_key(key, granularity)];
            for station in stations {
                let bounds = cell(grouped, key, station);
                row.push(whole_cell(bounds.map(|b| b.up)));
                row.push(whole_cell(bounds.map(|b| b.down)));
            }
            row
        })
        .collect();

    render_table(&headers, "------", &rows)
}

/// Stations across, average upper and lower limit down.
pub fn bounds_summary_table(summaries: &[BoundsSummary]) -> String {
    let headers = station_headers(summaries.iter().map(|s| s.station.as_str()));
    let up = labelled_row(UP_AVERAGE_LABEL, summaries.iter().map(|s| whole_cell(s.average_up)));
    let down = labelled_row(
        DOWN_AVERAGE_LABEL,
        summaries.iter().map(|s| whole_cell(s.average_down)),
    );
    render_table(&headers, "---", &[up, down])
}

/// Stations across, average bias and relative bias down.
pub fn bias_table(summaries: &[BiasSummary]) -> String {
    let headers = station_headers(summaries.iter().map(|s| s.station.as_str()));
    let bias = labelled_row(
        BIAS_ROW_LABEL,
        summaries.iter().map(|s| whole_cell(s.average_absolute_bias)),
    );
    let percent = labelled_row(
        PERCENT_ROW_LABEL,
        summaries.iter().map(|s| percent_cell(s.relative_bias_percent)),
    );
    render_table(&headers, "---", &[bias, percent])
}

fn station_headers<'a>(stations: impl Iterator<Item = &'a str>) -> Vec<String> {
    std::iter::once("电站")
        .chain(stations)
        .map(String::from)
        .collect()
}

fn labelled_row(label: &str, cells: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(label.to_string()).chain(cells).collect()
}
