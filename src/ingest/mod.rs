/// Series ingestion: where station data comes from and how a request's
/// fetches are fanned out.
///
/// Submodules:
/// - `payload`: decodes the workflow envelope into keyed points.
/// - `workflow`: live source, one POST per (station, series kind).
///
/// The local mock-file source lives in `crate::dev_mode`.

pub mod payload;
pub mod workflow;

use crate::error::{FetchError, InputError};
use crate::logging::{self, DataSource};
use crate::model::{Granularity, SeriesKind, StationSeries};
use crate::timefmt::{
    format_date, format_datetime, parse_date_window, parse_datetime_window, truncate_to_hour,
};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request window
// ---------------------------------------------------------------------------

/// Validated start/end of a request, kept both as the caller wrote it (for
/// query text and titles) and as canonical grouping keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestWindow {
    pub start: String,
    pub end: String,
    pub granularity: Granularity,
    first_key: String,
    last_key: String,
}

impl RequestWindow {
    /// Daily windows take `YYYY-MM-DD`, hourly windows `YYYY-MM-DD HH:MM:SS`.
    pub fn parse(start: &str, end: &str, granularity: Granularity) -> Result<Self, InputError> {
        let (first_key, last_key) = match granularity {
            Granularity::Daily => {
                let (s, e) = parse_date_window(start, end)?;
                (format_date(s), format_date(e))
            }
            Granularity::Hourly => {
                let (s, e) = parse_datetime_window(start, end)?;
                (format_datetime(truncate_to_hour(s)), format_datetime(e))
            }
        };
        Ok(Self {
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            granularity,
            first_key,
            last_key,
        })
    }

    /// Whether a grouping key falls inside the window.
    ///
    /// Keys are canonical date/datetime strings, so string order is time order.
    pub fn contains_key(&self, key: &str) -> bool {
        key >= self.first_key.as_str() && key <= self.last_key.as_str()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A place station series can be read from.
///
/// Implementations return the raw envelope; decoding happens after every
/// fetch of the request has finished. `Sync` because one source is shared by
/// all fetch workers of a request.
pub trait SeriesSource: Sync {
    /// Tag used when logging this source's failures.
    fn data_source(&self) -> DataSource;

    fn fetch(
        &self,
        station: &str,
        kind: SeriesKind,
        window: &RequestWindow,
    ) -> Result<Value, FetchError>;
}

// ---------------------------------------------------------------------------
// Fan-out / fan-in
// ---------------------------------------------------------------------------

/// Raw fetch results, one slot per station and per requested kind, in input order.
pub type RawResults = Vec<Vec<Result<Value, FetchError>>>;

/// Fetches every `(station, kind)` pair in parallel and waits for all of them.
///
/// Each worker writes only its own slot. A worker that panics is recorded as
/// a `FetchError::Worker` for its slot and does not disturb the others.
pub fn fetch_raw(
    source: &dyn SeriesSource,
    stations: &[String],
    kinds: &[SeriesKind],
    window: &RequestWindow,
) -> RawResults {
    std::thread::scope(|scope| {
        let handles: Vec<Vec<_>> = stations
            .iter()
            .map(|station| {
                kinds
                    .iter()
                    .map(|&kind| scope.spawn(move || source.fetch(station, kind, window)))
                    .collect()
            })
            .collect();

        handles
            .into_iter()
            .map(|per_station| {
                per_station
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| Err(FetchError::Worker(panic_message(&*panic))))
                    })
                    .collect()
            })
            .collect()
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

/// Fetch stage followed by parse stage.
///
/// Any fetch or decode failure leaves that series as `None` for its station;
/// the request as a whole always succeeds.
pub fn fetch_stations(
    source: &dyn SeriesSource,
    stations: &[String],
    kinds: &[SeriesKind],
    window: &RequestWindow,
) -> Vec<StationSeries> {
    let raw = fetch_raw(source, stations, kinds, window);
    let tag = source.data_source();

    let total = stations.len() * kinds.len();
    let mut failed = 0;

    let series = stations
        .iter()
        .zip(raw)
        .map(|(station, results)| {
            let mut out = StationSeries::new(station);
            for (&kind, result) in kinds.iter().zip(results) {
                let operation = format!("{} series", kind);
                let parsed = result.and_then(|envelope| match kind {
                    SeriesKind::Forecast | SeriesKind::Actual => {
                        payload::parse_series(&envelope, window.granularity).map(|points| {
                            if kind == SeriesKind::Forecast {
                                out.forecast = Some(points);
                            } else {
                                out.actual = Some(points);
                            }
                        })
                    }
                    SeriesKind::Bounds => payload::parse_bounds(&envelope, window.granularity)
                        .map(|points| out.bounds = Some(points)),
                });
                if let Err(err) = parsed {
                    failed += 1;
                    logging::log_fetch_failure(tag.clone(), station, &operation, &err);
                }
            }
            out
        })
        .collect();

    logging::log_fetch_summary(tag, total, total - failed, failed);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::payload::envelope_with_records;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct StubSource;

    impl SeriesSource for StubSource {
        fn data_source(&self) -> DataSource {
            DataSource::System
        }

        fn fetch(
            &self,
            station: &str,
            kind: SeriesKind,
            _window: &RequestWindow,
        ) -> Result<Value, FetchError> {
            match station {
                "down" => Err(FetchError::Status(503)),
                "boom" => panic!("worker exploded"),
                "garbled" => Ok(json!({"data": {"文本呈现": "not json"}})),
                _ => {
                    let value = if kind == SeriesKind::Forecast { 10.0 } else { 8.0 };
                    Ok(envelope_with_records(vec![
                        json!({"dataTime": "2025-01-01 00:00:00", "dataValue": value, "up": 12.0, "down": 6.0}),
                    ]))
                }
            }
        }
    }

    /// Each fetch checks in, then waits for every other fetch of the request
    /// to check in too. Only succeeds if all of them are in flight at once.
    struct RendezvousSource {
        arrived: AtomicUsize,
        expected: usize,
    }

    impl SeriesSource for RendezvousSource {
        fn data_source(&self) -> DataSource {
            DataSource::System
        }

        fn fetch(
            &self,
            _station: &str,
            _kind: SeriesKind,
            _window: &RequestWindow,
        ) -> Result<Value, FetchError> {
            self.arrived.fetch_add(1, Ordering::SeqCst);
            let deadline = Instant::now() + Duration::from_secs(5);
            while self.arrived.load(Ordering::SeqCst) < self.expected {
                if Instant::now() > deadline {
                    return Err(FetchError::Worker("fetches did not overlap".to_string()));
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(envelope_with_records(vec![]))
        }
    }

    fn window() -> RequestWindow {
        RequestWindow::parse("2025-01-01", "2025-01-03", Granularity::Daily).unwrap()
    }

    #[test]
    fn test_results_keep_input_order_and_isolate_failures() {
        let stations: Vec<String> = ["A", "down", "boom", "garbled", "B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let series = fetch_stations(
            &StubSource,
            &stations,
            &[SeriesKind::Forecast, SeriesKind::Actual],
            &window(),
        );

        let names: Vec<_> = series.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(names, vec!["A", "down", "boom", "garbled", "B"]);

        assert_eq!(series[0].forecast.as_ref().unwrap()[0].value, 10.0);
        assert_eq!(series[0].actual.as_ref().unwrap()[0].value, 8.0);
        for failed in &series[1..4] {
            assert!(failed.forecast.is_none() && failed.actual.is_none());
        }
        assert!(series[4].forecast.is_some());
    }

    #[test]
    fn test_every_station_and_kind_is_fetched_concurrently() {
        let stations: Vec<String> = ["龚嘴", "大岗山", "瀑布沟", "猴子岩"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let kinds = [SeriesKind::Forecast, SeriesKind::Actual];
        let source = RendezvousSource {
            arrived: AtomicUsize::new(0),
            expected: stations.len() * kinds.len(),
        };

        let raw = fetch_raw(&source, &stations, &kinds, &window());

        assert_eq!(raw.len(), 4);
        for per_station in &raw {
            assert_eq!(per_station.len(), 2);
            for result in per_station {
                assert!(result.is_ok(), "sequential fetch detected: {:?}", result);
            }
        }
    }

    #[test]
    fn test_panicking_worker_becomes_worker_error() {
        let raw = fetch_raw(&StubSource, &["boom".to_string()], &[SeriesKind::Bounds], &window());
        match &raw[0][0] {
            Err(FetchError::Worker(msg)) => assert!(msg.contains("worker exploded")),
            other => panic!("expected worker error, got {:?}", other),
        }
    }

    #[test]
    fn test_bounds_kind_fills_only_bounds() {
        let series = fetch_stations(&StubSource, &["A".to_string()], &[SeriesKind::Bounds], &window());
        assert!(series[0].forecast.is_none());
        assert_eq!(series[0].bounds.as_ref().unwrap()[0].bounds.up, 12.0);
    }

    #[test]
    fn test_window_contains_key() {
        let daily = window();
        assert!(daily.contains_key("2025-01-01"));
        assert!(daily.contains_key("2025-01-03"));
        assert!(!daily.contains_key("2025-01-04"));

        let hourly =
            RequestWindow::parse("2025-08-07 09:30:00", "2025-08-07 12:00:00", Granularity::Hourly)
                .unwrap();
        assert!(hourly.contains_key("2025-08-07 09:00:00"));
        assert!(hourly.contains_key("2025-08-07 12:00:00"));
        assert!(!hourly.contains_key("2025-08-07 13:00:00"));
    }

    #[test]
    fn test_window_rejects_wrong_layout_for_granularity() {
        assert!(RequestWindow::parse("2025-08-07", "2025-08-08", Granularity::Hourly).is_err());
        assert!(RequestWindow::parse("2025-08-07 00:00:00", "2025-08-08", Granularity::Daily).is_err());
    }
}
