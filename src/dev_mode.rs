/// Development mode: serve station series from local JSON files
///
/// When the workflow platform is unreachable (or during development), use
/// this source to replay saved responses. Each file holds one envelope in the
/// same shape the workflow returns, named `<station><日|小时><kind>.json`,
/// e.g. `龚嘴小时上下限.json` or `瀑布沟日实测.json`.
///
/// A missing or unreadable file is not an error: it yields an empty envelope
/// (code 404 / 500) so the station simply shows up as "no data".

use crate::error::FetchError;
use crate::ingest::payload::{self, empty_envelope, envelope_with_records};
use crate::ingest::{RequestWindow, SeriesSource};
use crate::logging::{self, DataSource};
use crate::model::{Granularity, SeriesKind};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Configuration for development mode file replay
pub struct MockFileSource {
    /// Directory holding the saved envelopes
    pub dir: PathBuf,
}

impl MockFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing one station series.
    pub fn file_path(&self, station: &str, kind: SeriesKind, granularity: Granularity) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}.json",
            station,
            granularity.file_infix(),
            kind.file_suffix()
        ))
    }

    /// Reads a saved envelope, degrading every failure to an empty one.
    pub fn read_envelope(path: &Path) -> Value {
        if !path.exists() {
            return empty_envelope(404, &format!("File not found: {}", path.display()));
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(FetchError::from)
            .and_then(|text| serde_json::from_str::<Value>(text.trim()).map_err(FetchError::from));

        match parsed {
            Ok(envelope) => envelope,
            Err(e) => empty_envelope(500, &format!("Error reading file: {}", e)),
        }
    }

    /// Drops records outside the window; the live endpoint filters by the
    /// query text itself, saved files cover whatever period they were saved for.
    ///
    /// Records whose time cannot be read are kept so the parse stage sees them.
    fn restrict_to_window(envelope: Value, window: &RequestWindow) -> Value {
        match payload::extract_records(&envelope) {
            Ok(records) => envelope_with_records(
                records
                    .into_iter()
                    .filter(|item| {
                        payload::record_key(item, window.granularity)
                            .map(|key| window.contains_key(&key))
                            .unwrap_or(true)
                    })
                    .collect(),
            ),
            Err(_) => envelope,
        }
    }
}

impl SeriesSource for MockFileSource {
    fn data_source(&self) -> DataSource {
        DataSource::MockFile
    }

    fn fetch(
        &self,
        station: &str,
        kind: SeriesKind,
        window: &RequestWindow,
    ) -> Result<Value, FetchError> {
        let path = self.file_path(station, kind, window.granularity);
        let envelope = Self::read_envelope(&path);

        let code = envelope.get("code").and_then(|c| c.as_u64()).unwrap_or(200);
        if code != 200 {
            let msg = envelope.get("msg").and_then(|m| m.as_str()).unwrap_or_default();
            logging::log_failure_message(
                DataSource::MockFile,
                station,
                &format!("{} series", kind),
                msg,
            );
        }

        Ok(Self::restrict_to_window(envelope, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::payload::parse_bounds;
    use crate::logging::{FailureType, classify_fetch_failure};
    use serde_json::json;

    #[test]
    fn test_file_path_naming() {
        let source = MockFileSource::new("json_files_hours");
        assert_eq!(
            source.file_path("龚嘴", SeriesKind::Bounds, Granularity::Hourly),
            PathBuf::from("json_files_hours/龚嘴小时上下限.json")
        );
        assert_eq!(
            source.file_path("瀑布沟", SeriesKind::Actual, Granularity::Daily),
            PathBuf::from("json_files_hours/瀑布沟日实测.json")
        );
    }

    #[test]
    fn test_missing_file_yields_empty_404_envelope() {
        let envelope = MockFileSource::read_envelope(Path::new("/nonexistent/沙南日上下限.json"));
        assert_eq!(envelope["code"], 404);
        assert_eq!(envelope["data"]["文本呈现"], "[]");
        // logged at debug: a station without a file is routine
        let msg = envelope["msg"].as_str().unwrap();
        assert_eq!(classify_fetch_failure(msg), FailureType::Expected);
    }

    #[test]
    fn test_corrupt_file_yields_empty_500_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("龚嘴日上下限.json");
        std::fs::write(&path, "{not json").unwrap();
        let envelope = MockFileSource::read_envelope(&path);
        assert_eq!(envelope["code"], 500);
        assert_eq!(envelope["data"]["文本呈现"], "[]");
        let msg = envelope["msg"].as_str().unwrap();
        assert_eq!(classify_fetch_failure(msg), FailureType::Unexpected);
    }

    #[test]
    fn test_fetch_keeps_only_records_inside_window() {
        let dir = tempfile::tempdir().unwrap();
        let records = json!([
            {"dataTime": "2025-08-04 00:00:00", "up": 10.0, "down": 5.0},
            {"dataTime": "2025-08-05 00:00:00", "up": 11.0, "down": 6.0},
            {"dataTime": "2025-08-16 00:00:00", "up": 12.0, "down": 7.0}
        ]);
        let body = json!({"code": 200, "data": {"文本呈现": records.to_string()}});
        std::fs::write(dir.path().join("龚嘴日上下限.json"), body.to_string()).unwrap();

        let source = MockFileSource::new(dir.path());
        let window = RequestWindow::parse("2025-08-05", "2025-08-15", Granularity::Daily).unwrap();
        let envelope = source.fetch("龚嘴", SeriesKind::Bounds, &window).unwrap();
        let points = parse_bounds(&envelope, Granularity::Daily).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].key, "2025-08-05");
    }
}
