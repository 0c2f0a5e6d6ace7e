//! ECharts option objects for the inflow tools.
//!
//! Only the option schema matters here; the front end renders it. Missing
//! statistics are plotted as `0` so every axis stays numeric.

use crate::analysis::groupings::{BoundsByKey, cell};
use crate::analysis::round_whole;
use crate::model::{BiasSummary, BoundsSummary, Granularity};
use crate::render::markdown::{
    BIAS_ROW_LABEL, DOWN_AVERAGE_LABEL, PERCENT_ROW_LABEL, UP_AVERAGE_LABEL, display_key,
};
use serde_json::{Value, json};

const PALETTE: [&str; 8] = [
    "#FF4D4F", "#52C41A", "#1890FF", "#FAAD14", "#722ED1", "#13C2C2", "#EB2F96", "#F5222D",
];

const FLOW_AXIS_NAME: &str = "流量(m³/s)";

/// Whole-number data point, `0` when missing.
pub fn whole_value(value: Option<f64>) -> Value {
    json!(value.map(|v| round_whole(v) as i64).unwrap_or(0))
}

/// One-decimal data point, `0` when missing.
pub fn percent_value(value: Option<f64>) -> Value {
    match value {
        Some(v) => json!(v),
        None => json!(0),
    }
}

fn title(text: &str) -> Value {
    json!({ "text": text, "left": 14 })
}

fn legend(names: Vec<String>) -> Value {
    json!({
        "data": names,
        "icon": "roundRect",
        "top": 50,
        "itemWidth": 12,
        "itemHeight": 8,
        "itemGap": 16,
        "textStyle": {
            "rich": { "a": { "verticalAlign": "middle" } },
            "padding": [3, 0, 0, 0]
        }
    })
}

fn grid() -> Value {
    json!({ "top": 80, "bottom": 20, "left": 20, "right": 20, "containLabel": true })
}

fn category_axis(labels: Vec<String>, rotate: Option<i32>) -> Value {
    let mut axis_label = json!({ "textStyle": { "color": "#86909C" } });
    if let Some(degrees) = rotate {
        axis_label["rotate"] = json!(degrees);
    }
    json!({
        "type": "category",
        "data": labels,
        "axisTick": { "show": false },
        "axisLabel": axis_label,
        "axisLine": { "lineStyle": { "color": "#c9cdd4" } }
    })
}

fn flow_axis(name: &str) -> Value {
    json!({
        "type": "value",
        "name": name,
        "nameTextStyle": { "padding": [0, 0, 0, 0] },
        "splitLine": { "lineStyle": { "type": "dashed" } }
    })
}

/// Dual-axis chart: average bias as bars, relative bias as a line.
pub fn station_bias_option(chart_title: &str, summaries: &[BiasSummary]) -> Value {
    let stations: Vec<String> = summaries.iter().map(|s| s.station.clone()).collect();
    let bias: Vec<Value> = summaries
        .iter()
        .map(|s| whole_value(s.average_absolute_bias))
        .collect();
    let percent: Vec<Value> = summaries
        .iter()
        .map(|s| percent_value(s.relative_bias_percent))
        .collect();

    json!({
        "title": title(chart_title),
        "tooltip": { "trigger": "axis" },
        "legend": legend(vec![BIAS_ROW_LABEL.to_string(), PERCENT_ROW_LABEL.to_string()]),
        "grid": grid(),
        "xAxis": category_axis(stations, None),
        "yAxis": [
            {
                "type": "value",
                "name": BIAS_ROW_LABEL,
                "nameTextStyle": { "padding": [0, -20, 0, 0] },
                "splitLine": { "lineStyle": { "type": "dashed" } }
            },
            {
                "type": "value",
                "name": PERCENT_ROW_LABEL,
                "nameTextStyle": { "padding": [0, 0, 0, 0] },
                "splitLine": { "show": false }
            }
        ],
        "series": [
            {
                "name": BIAS_ROW_LABEL,
                "type": "bar",
                "data": bias,
                "itemStyle": { "color": "#008AFA" },
                "barGap": 0,
                "yAxisIndex": 0
            },
            {
                "name": PERCENT_ROW_LABEL,
                "type": "line",
                "data": percent,
                "itemStyle": { "color": "#FFAA00" },
                "lineStyle": { "color": "#FFAA00", "width": 3 },
                "symbol": "circle",
                "symbolSize": 8,
                "yAxisIndex": 1
            }
        ]
    })
}

/// Time-series chart: a solid upper and a dashed lower line per station.
pub fn bounds_by_key_option(
    chart_title: &str,
    stations: &[String],
    grouped: &BoundsByKey,
    granularity: Granularity,
) -> Value {
    let mut series = Vec::with_capacity(stations.len() * 2);
    for (i, station) in stations.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let line = |name: String, pick: fn(&crate::model::BoundPair) -> f64, dashed: bool| {
            let data: Vec<Value> = grouped
                .keys()
                .map(|key| whole_value(cell(grouped, key, station).map(pick)))
                .collect();
            let mut line_style = json!({ "color": color, "width": 2 });
            if dashed {
                line_style["type"] = json!("dashed");
            }
            json!({
                "name": name,
                "type": "line",
                "data": data,
                "itemStyle": { "color": color },
                "lineStyle": line_style,
                "symbol": "circle",
                "symbolSize": 6
            })
        };
        series.push(line(format!("{}上限", station), |b| b.up, false));
        series.push(line(format!("{}下限", station), |b| b.down, true));
    }

    let legend_names: Vec<String> = stations
        .iter()
        .map(|s| format!("{}上限", s))
        .chain(stations.iter().map(|s| format!("{}下限", s)))
        .collect();
    let labels: Vec<String> = grouped
        .keys()
        .map(|key| display_key(key, granularity))
        .collect();

    json!({
        "title": title(chart_title),
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "cross" } },
        "legend": legend(legend_names),
        "grid": grid(),
        "xAxis": category_axis(labels, Some(45)),
        "yAxis": flow_axis(FLOW_AXIS_NAME),
        "series": series
    })
}

/// Grouped bar chart of average upper and lower limit per station.
pub fn bounds_summary_option(chart_title: &str, summaries: &[BoundsSummary]) -> Value {
    let stations: Vec<String> = summaries.iter().map(|s| s.station.clone()).collect();
    let up: Vec<Value> = summaries.iter().map(|s| whole_value(s.average_up)).collect();
    let down: Vec<Value> = summaries.iter().map(|s| whole_value(s.average_down)).collect();

    json!({
        "title": title(chart_title),
        "tooltip": { "trigger": "axis" },
        "legend": legend(vec![UP_AVERAGE_LABEL.to_string(), DOWN_AVERAGE_LABEL.to_string()]),
        "grid": grid(),
        "xAxis": category_axis(stations, None),
        "yAxis": flow_axis(FLOW_AXIS_NAME),
        "series": [
            {
                "name": UP_AVERAGE_LABEL,
                "type": "bar",
                "data": up,
                "itemStyle": { "color": PALETTE[2] },
                "barGap": 0
            },
            {
                "name": DOWN_AVERAGE_LABEL,
                "type": "bar",
                "data": down,
                "itemStyle": { "color": PALETTE[3] }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::groupings::group_bounds_by_key;
    use crate::model::{BoundPair, BoundPoint, StationSeries};

    #[test]
    fn test_missing_values_plot_as_zero() {
        assert_eq!(whole_value(None), json!(0));
        assert_eq!(percent_value(None), json!(0));
        assert_eq!(whole_value(Some(2.4)), json!(2));
        assert_eq!(percent_value(Some(25.0)), json!(25.0));
    }

    #[test]
    fn test_bias_option_series_align_with_stations() {
        let summaries = vec![
            BiasSummary {
                station: "A".into(),
                average_absolute_bias: Some(2.0),
                average_actual_value: Some(8.0),
                relative_bias_percent: Some(25.0),
            },
            BiasSummary { station: "B".into(), ..BiasSummary::default() },
        ];
        let option = station_bias_option("t", &summaries);
        assert_eq!(option["xAxis"]["data"], json!(["A", "B"]));
        assert_eq!(option["series"][0]["data"], json!([2, 0]));
        assert_eq!(option["series"][1]["data"], json!([25.0, 0]));
        assert_eq!(option["series"][1]["yAxisIndex"], 1);
    }

    #[test]
    fn test_bounds_option_one_up_and_one_down_line_per_station() {
        let series = vec![StationSeries {
            station: "龚嘴".into(),
            bounds: Some(vec![BoundPoint {
                key: "2025-08-07 09:00:00".into(),
                bounds: BoundPair { up: 2300.0, down: 1800.0 },
            }]),
            ..StationSeries::default()
        }];
        let stations = vec!["龚嘴".to_string(), "大岗山".to_string()];
        let option = bounds_by_key_option(
            "t",
            &stations,
            &group_bounds_by_key(&series),
            Granularity::Hourly,
        );

        let names: Vec<&str> = option["series"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["龚嘴上限", "龚嘴下限", "大岗山上限", "大岗山下限"]);
        assert_eq!(option["series"][1]["lineStyle"]["type"], "dashed");
        assert_eq!(option["series"][2]["data"], json!([0]));
        assert_eq!(option["xAxis"]["data"], json!(["2025-08-07 09:00"]));
        assert_eq!(option["xAxis"]["axisLabel"]["rotate"], 45);
    }
}
