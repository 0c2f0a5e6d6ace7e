/// Workflow API client
///
/// Retrieves station inflow series from the AI workflow platform. Each call
/// is a POST carrying a natural-language query ("<station><start>至<end>入库流量")
/// plus the series type and data type; the platform answers with the standard
/// `{data: {文本呈现: [...]}}` envelope.
///
/// The client is blocking. Parallelism across stations comes from
/// `ingest::fetch_raw`, which runs one call per worker thread.

use crate::config::WorkflowConfig;
use crate::error::FetchError;
use crate::ingest::{RequestWindow, SeriesSource};
use crate::logging::DataSource;
use crate::model::SeriesKind;
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Workflow `type` value for the probabilistic bounds query.
pub const BOUNDS_TYPE: &str = "上下限";

pub struct WorkflowClient {
    client: reqwest::blocking::Client,
    config: WorkflowConfig,
}

impl WorkflowClient {
    pub fn new(config: WorkflowConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Natural-language query text sent to the workflow.
    pub fn query_text(station: &str, window: &RequestWindow) -> String {
        format!("{}{}至{}入库流量", station, window.start, window.end)
    }

    /// Request body for one (station, kind) call.
    pub fn build_payload(&self, station: &str, kind: SeriesKind, window: &RequestWindow) -> Value {
        let series_type = match kind {
            SeriesKind::Bounds => BOUNDS_TYPE,
            SeriesKind::Forecast | SeriesKind::Actual => window.granularity.series_type(),
        };

        let field = |name: &str| format!("{}.{}", self.config.field_id, name);
        let mut input_data = Map::new();
        input_data.insert(field("text"), json!(Self::query_text(station, window)));
        input_data.insert(field("type"), json!(series_type));
        input_data.insert(field("dataType"), json!(kind.data_type()));
        input_data.insert(field("system_str"), json!(self.config.system_str));

        json!({
            "user_id": self.config.user_id,
            "wid": self.config.wid,
            "input_data": input_data,
            "stream": false
        })
    }
}

impl SeriesSource for WorkflowClient {
    fn data_source(&self) -> DataSource {
        DataSource::Workflow
    }

    fn fetch(
        &self,
        station: &str,
        kind: SeriesKind,
        window: &RequestWindow,
    ) -> Result<Value, FetchError> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(&self.build_payload(station, kind, window))
            .send()?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Granularity;

    fn client() -> WorkflowClient {
        WorkflowClient::new(WorkflowConfig::default()).expect("client builds")
    }

    fn daily_window() -> RequestWindow {
        RequestWindow::parse("2025-07-25", "2025-07-29", Granularity::Daily).unwrap()
    }

    #[test]
    fn test_payload_shape_for_daily_forecast() {
        let payload = client().build_payload("瀑布沟", SeriesKind::Forecast, &daily_window());
        let field = "9e895884-591f-455a-a00c-4e9eac9a09d0";

        assert_eq!(payload["user_id"], 999);
        assert_eq!(payload["wid"], "db18dab3a8d54af59a655668127ba3c7");
        assert_eq!(payload["stream"], false);
        let input = &payload["input_data"];
        assert_eq!(input[format!("{}.text", field)], "瀑布沟2025-07-25至2025-07-29入库流量");
        assert_eq!(input[format!("{}.type", field)], "逐日");
        assert_eq!(input[format!("{}.dataType", field)], "预报");
        assert_eq!(input[format!("{}.system_str", field)], "数据中台");
    }

    #[test]
    fn test_payload_types_for_actual_and_bounds() {
        let c = client();
        let actual = c.build_payload("龚嘴", SeriesKind::Actual, &daily_window());
        let bounds = c.build_payload("龚嘴", SeriesKind::Bounds, &daily_window());
        let field = WorkflowConfig::default().field_id;

        assert_eq!(actual["input_data"][format!("{}.dataType", field)], "实测");
        assert_eq!(bounds["input_data"][format!("{}.type", field)], "上下限");
        assert_eq!(bounds["input_data"][format!("{}.dataType", field)], "预报");
    }

    #[test]
    fn test_payload_type_for_hourly_series() {
        let window =
            RequestWindow::parse("2025-08-07 09:00:00", "2025-08-07 18:00:00", Granularity::Hourly)
                .unwrap();
        let payload = client().build_payload("龚嘴", SeriesKind::Forecast, &window);
        let field = WorkflowConfig::default().field_id;
        assert_eq!(payload["input_data"][format!("{}.type", field)], "逐小时");
        assert_eq!(
            payload["input_data"][format!("{}.text", field)],
            "龚嘴2025-08-07 09:00:00至2025-08-07 18:00:00入库流量"
        );
    }
}

// ---------------------------------------------------------------------------
// Integration Tests - live workflow endpoint
// ---------------------------------------------------------------------------
//
// These hit the real intranet endpoint and need INFLOW_WORKFLOW_TOKEN set.
// They are #[ignore]d so normal builds don't depend on the network.
//
//   cargo test -- --ignored workflow_api

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::config;
    use crate::ingest::payload::parse_series;
    use crate::model::Granularity;

    #[test]
    #[ignore] // Don't run in CI - depends on the intranet workflow endpoint
    fn workflow_api_returns_forecast_series_for_pubugou() {
        let cfg = config::load(None).expect("config loads");
        let client = WorkflowClient::new(cfg.workflow).expect("client builds");
        let window = RequestWindow::parse("2025-07-25", "2025-07-29", Granularity::Daily).unwrap();

        let envelope = client
            .fetch("瀑布沟", SeriesKind::Forecast, &window)
            .expect("workflow call should succeed");
        let points = parse_series(&envelope, Granularity::Daily).expect("payload should decode");

        assert!(!points.is_empty(), "瀑布沟 should have forecast data for late July 2025");
    }
}
