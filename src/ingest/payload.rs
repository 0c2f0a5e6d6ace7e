//! Workflow response envelopes.
//!
//! The workflow answers with `{"data": {"文本呈现": ...}}` where the inner
//! value is a list of records, either as a JSON array or as a string holding
//! one. Strings are decoded with the strict JSON parser; anything that is not
//! valid JSON fails the whole series.
//!
//! Each record carries `dataTime` plus either `dataValue` or `up`/`down`.

use crate::analysis::round_whole;
use crate::error::FetchError;
use crate::model::{BoundPair, BoundPoint, Granularity, TimeSeriesPoint};
use crate::timefmt::{parse_date, parse_datetime};
use serde::Deserialize;
use serde_json::{Value, json};

/// Field under `data` holding the record list.
pub const TEXT_FIELD: &str = "文本呈现";

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "dataTime")]
    data_time: String,
    #[serde(rename = "dataValue", default)]
    data_value: Option<f64>,
    #[serde(default)]
    up: Option<f64>,
    #[serde(default)]
    down: Option<f64>,
}

/// Envelope with an empty record list, used when a source has nothing to give.
pub fn empty_envelope(code: u16, msg: &str) -> Value {
    json!({
        "code": code,
        "msg": msg,
        "data": { TEXT_FIELD: "[]" }
    })
}

/// Envelope wrapping an already-decoded record list.
pub fn envelope_with_records(records: Vec<Value>) -> Value {
    json!({
        "code": 200,
        "msg": "ok",
        "data": { TEXT_FIELD: records }
    })
}

/// Pulls the record list out of an envelope.
pub fn extract_records(envelope: &Value) -> Result<Vec<Value>, FetchError> {
    let text = envelope
        .get("data")
        .and_then(|d| d.get(TEXT_FIELD))
        .ok_or_else(|| FetchError::Payload(format!("missing data.{}", TEXT_FIELD)))?;

    let list = match text {
        Value::String(s) => serde_json::from_str::<Value>(s)?,
        other => other.clone(),
    };

    match list {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::Payload(format!(
            "data.{} is not a list: {}",
            TEXT_FIELD, other
        ))),
    }
}

/// Grouping key for a record timestamp.
///
/// Daily keys are the first 10 characters (`YYYY-MM-DD`); hourly keys are the
/// first 13 with minutes and seconds zeroed (`YYYY-MM-DD HH:00:00`). An ISO
/// `T` separator is accepted.
pub fn truncate_key(data_time: &str, granularity: Granularity) -> Result<String, FetchError> {
    let bad = || FetchError::Payload(format!("unusable dataTime: {:?}", data_time));
    match granularity {
        Granularity::Daily => {
            let day = data_time.get(..10).ok_or_else(bad)?;
            parse_date(day).map_err(|_| bad())?;
            Ok(day.to_string())
        }
        Granularity::Hourly => {
            let hour = data_time.get(..13).ok_or_else(bad)?.replacen('T', " ", 1);
            let key = format!("{}:00:00", hour);
            parse_datetime(&key).map_err(|_| bad())?;
            Ok(key)
        }
    }
}

fn decode(item: Value) -> Result<RawRecord, FetchError> {
    serde_json::from_value(item).map_err(|e| FetchError::Payload(format!("bad record: {}", e)))
}

/// Decodes a forecast/actual series. Values are rounded to whole m³/s.
pub fn parse_series(
    envelope: &Value,
    granularity: Granularity,
) -> Result<Vec<TimeSeriesPoint>, FetchError> {
    extract_records(envelope)?
        .into_iter()
        .map(|item| {
            let record = decode(item)?;
            let value = record.data_value.ok_or_else(|| {
                FetchError::Payload(format!("record {} has no dataValue", record.data_time))
            })?;
            Ok(TimeSeriesPoint {
                key: truncate_key(&record.data_time, granularity)?,
                value: round_whole(value),
            })
        })
        .collect()
}

/// Decodes a bounds series. Limits are rounded to whole m³/s.
pub fn parse_bounds(
    envelope: &Value,
    granularity: Granularity,
) -> Result<Vec<BoundPoint>, FetchError> {
    extract_records(envelope)?
        .into_iter()
        .map(|item| {
            let record = decode(item)?;
            let (up, down) = match (record.up, record.down) {
                (Some(up), Some(down)) => (up, down),
                _ => {
                    return Err(FetchError::Payload(format!(
                        "record {} has no up/down",
                        record.data_time
                    )));
                }
            };
            Ok(BoundPoint {
                key: truncate_key(&record.data_time, granularity)?,
                bounds: BoundPair {
                    up: round_whole(up),
                    down: round_whole(down),
                },
            })
        })
        .collect()
}

/// Grouping key of a raw record, if it has a usable `dataTime`.
pub fn record_key(item: &Value, granularity: Granularity) -> Option<String> {
    item.get("dataTime")
        .and_then(|t| t.as_str())
        .and_then(|t| truncate_key(t, granularity).ok())
}
