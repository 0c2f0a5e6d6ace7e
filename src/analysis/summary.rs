//! Per-station statistics: bound averages and forecast-vs-actual bias.
//!
//! Bias is only ever computed over the keys present in both the forecast and
//! the actual series. Keys present in only one of them are dropped, never
//! filled in. Empty inputs give `None`, never a division by zero.

use crate::model::{BiasSummary, BoundsSummary, StationSeries, keyed_values};

/// Rounds to a whole number, ties to even.
pub fn round_whole(value: f64) -> f64 {
    value.round_ties_even()
}

/// Rounds to one decimal place, ties to even.
///
/// Rounds the exact decimal expansion of `value`: `-14.95` is stored as
/// `-14.9499...` and gives `-14.9`. Scaling by ten first would land on
/// `-149.5` and round away.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Mean upper and lower limit over the station's own series.
pub fn bounds_summary(series: &StationSeries) -> BoundsSummary {
    let points = series.bounds.as_deref().unwrap_or_default();
    BoundsSummary {
        station: series.station.clone(),
        average_up: mean(points.iter().map(|p| p.bounds.up)),
        average_down: mean(points.iter().map(|p| p.bounds.down)),
    }
}

/// Forecast-vs-actual bias over the dates both series share.
///
/// - `average_absolute_bias` = mean of `forecast - actual`
/// - `average_actual_value` = mean of `actual`
/// - `relative_bias_percent` = `(mean forecast - mean actual) / mean actual × 100`,
///   one decimal; `None` if the mean actual is zero
pub fn bias_summary(series: &StationSeries) -> BiasSummary {
    let mut summary = BiasSummary {
        station: series.station.clone(),
        ..BiasSummary::default()
    };

    let (Some(forecast), Some(actual)) = (&series.forecast, &series.actual) else {
        return summary;
    };

    let forecast = keyed_values(forecast);
    let actual = keyed_values(actual);
    let common: Vec<(f64, f64)> = forecast
        .iter()
        .filter_map(|(key, f)| actual.get(key).map(|a| (*f, *a)))
        .collect();

    summary.average_absolute_bias = mean(common.iter().map(|(f, a)| f - a));
    summary.average_actual_value = mean(common.iter().map(|(_, a)| *a));

    let average_forecast = mean(common.iter().map(|(f, _)| *f));
    summary.relative_bias_percent = match (average_forecast, summary.average_actual_value) {
        (Some(f), Some(a)) if a != 0.0 => Some(round_one_decimal((f - a) / a * 100.0)),
        _ => None,
    };

    summary
}
