/// Organizes per-station bound series into one row per date/hour key.
///
/// A station/key cell exists only if that station reported that key; nothing
/// is interpolated. Keys are canonical date/datetime strings, so the
/// `BTreeMap` iterates them in time order.

use crate::model::{BoundPair, StationSeries};
use std::collections::BTreeMap;

/// key → station → bounds
pub type BoundsByKey = BTreeMap<String, BTreeMap<String, BoundPair>>;

/// Groups every station's bound points by key.
///
/// Stations without a bounds series contribute nothing. If a station reports
/// the same key twice, the later point wins.
pub fn group_bounds_by_key(series: &[StationSeries]) -> BoundsByKey {
    let mut grouped = BoundsByKey::new();
    for station in series {
        for point in station.bounds.iter().flatten() {
            grouped
                .entry(point.key.clone())
                .or_default()
                .insert(station.station.clone(), point.bounds);
        }
    }
    grouped
}

/// Bounds for one station at one key, if reported.
pub fn cell<'a>(grouped: &'a BoundsByKey, key: &str, station: &str) -> Option<&'a BoundPair> {
    grouped.get(key).and_then(|row| row.get(station))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundPoint;

    fn station(name: &str, points: &[(&str, f64, f64)]) -> StationSeries {
        StationSeries {
            station: name.to_string(),
            bounds: Some(
                points
                    .iter()
                    .map(|(k, up, down)| BoundPoint {
                        key: k.to_string(),
                        bounds: BoundPair { up: *up, down: *down },
                    })
                    .collect(),
            ),
            ..StationSeries::default()
        }
    }

    #[test]
    fn test_cells_exist_only_where_reported() {
        let series = vec![
            station("龚嘴", &[("2025-08-06", 10.0, 5.0), ("2025-08-05", 11.0, 6.0)]),
            station("大岗山", &[("2025-08-06", 20.0, 15.0)]),
            StationSeries::new("沙南"),
        ];
        let grouped = group_bounds_by_key(&series);

        let keys: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(keys, vec!["2025-08-05", "2025-08-06"]);
        assert_eq!(cell(&grouped, "2025-08-06", "大岗山").unwrap().up, 20.0);
        assert!(cell(&grouped, "2025-08-05", "大岗山").is_none());
        assert!(cell(&grouped, "2025-08-05", "沙南").is_none());
    }

    #[test]
    fn test_no_bounds_anywhere_gives_empty_grouping() {
        let series = vec![StationSeries::new("A"), StationSeries::new("B")];
        assert!(group_bounds_by_key(&series).is_empty());
    }
}
