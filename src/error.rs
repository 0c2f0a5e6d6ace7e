//! Error types for the inflow tools.
//!
//! Input errors are always returned to the caller. Fetch errors are caught at
//! the station boundary and turned into "no data"; only the single-shot
//! hourly-actual range lookup lets them escape, wrapped in `ResolveError`.

use thiserror::Error;

/// A malformed or inconsistent request window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The string does not match the expected layout exactly.
    #[error("日期格式错误，请严格按照{expected}格式输入，当前输入: {input}")]
    Format { input: String, expected: &'static str },

    /// `start` is after `end`.
    #[error("开始时间不能晚于结束时间: {start} > {end}")]
    Ordering { start: String, end: String },
}

/// Failure to obtain or decode one station series.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// The envelope decoded but its contents are not what we expect.
    #[error("Parse error: {0}")]
    Payload(String),

    /// A per-station worker panicked before producing a result.
    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Errors from the hourly-actual range lookup, the one resolver that calls out.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("rain summation lookup failed: {0}")]
    Upstream(#[from] FetchError),
}

/// Errors loading the TOML configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
