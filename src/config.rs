/// Service configuration.
///
/// Loaded from a TOML file when one is given, falling back to built-in
/// defaults for anything the file leaves out. A handful of environment
/// variables (read after `dotenv`, so a local `.env` works) override the
/// file; the bearer token in particular is expected to come from there.
///
/// ```toml
/// [workflow]
/// url = "http://10.163.25.156:11105/ai_workflow/workflow/workflow_api_run"
/// timeout_secs = 30
///
/// [mock]
/// dir = "json_files"
///
/// [logging]
/// level = "debug"
/// ```

use crate::error::ConfigError;
use crate::logging::LogLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_WORKFLOW_URL: &str = "INFLOW_WORKFLOW_URL";
pub const ENV_WORKFLOW_TOKEN: &str = "INFLOW_WORKFLOW_TOKEN";
pub const ENV_MOCK_DIR: &str = "INFLOW_MOCK_DIR";
pub const ENV_LOG_FILE: &str = "INFLOW_LOG_FILE";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub workflow: WorkflowConfig,
    pub pictures: PictureConfig,
    pub mock: MockConfig,
    pub logging: LoggingConfig,
}

/// Remote workflow endpoint that answers natural-language series queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub url: String,
    pub token: String,
    pub user_id: u32,
    pub wid: String,
    /// Input node id; request fields are `<field_id>.text`, `<field_id>.type`, ...
    pub field_id: String,
    pub system_str: String,
    pub timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            url: "http://10.163.25.156:11105/ai_workflow/workflow/workflow_api_run".to_string(),
            token: String::new(),
            user_id: 999,
            wid: "db18dab3a8d54af59a655668127ba3c7".to_string(),
            field_id: "9e895884-591f-455a-a00c-4e9eac9a09d0".to_string(),
            system_str: "数据中台".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Image host for the rainfall pictures and the rain summation endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PictureConfig {
    pub base_url: String,
    pub daily_actual_product: String,
    pub daily_forecast_product: String,
    pub hourly_forecast_product: String,
    pub rain_sum_url: String,
}

impl Default for PictureConfig {
    fn default() -> Self {
        Self {
            base_url: "http://10.163.25.156:8502/hsimg/img".to_string(),
            daily_actual_product: "1301".to_string(),
            daily_forecast_product: "1381".to_string(),
            hourly_forecast_product: "1382".to_string(),
            rain_sum_url: "http://10.163.25.156:8502/hsimg/api/rainSum".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Directory of `<station><日|小时><kind>.json` files. When set, the CLI
    /// reads these instead of calling the workflow endpoint.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    /// Unknown level names fall back to `Info`.
    pub fn min_level(&self) -> LogLevel {
        match self.level.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a TOML document into a `Config`.
pub fn parse(text: &str, origin: &str) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Loads configuration from `path` (defaults if `None` or the file does not
/// exist), then applies environment overrides.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    dotenv::dotenv().ok();

    let mut config = match path {
        Some(p) if p.exists() => {
            let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                path: p.display().to_string(),
                source,
            })?;
            parse(&text, &p.display().to_string())?
        }
        _ => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment overrides through `lookup` so tests can inject values
/// without touching the process environment.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_WORKFLOW_URL) {
        config.workflow.url = url;
    }
    if let Some(token) = lookup(ENV_WORKFLOW_TOKEN) {
        config.workflow.token = token;
    }
    if let Some(dir) = lookup(ENV_MOCK_DIR) {
        config.mock.dir = Some(PathBuf::from(dir));
    }
    if let Some(file) = lookup(ENV_LOG_FILE) {
        config.logging.file = Some(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = parse("", "inline").expect("empty TOML is valid");
        assert_eq!(config.workflow.user_id, 999);
        assert_eq!(config.workflow.system_str, "数据中台");
        assert!(config.workflow.token.is_empty());
        assert_eq!(config.pictures.daily_actual_product, "1301");
        assert!(config.mock.dir.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse(
            "[workflow]\nurl = \"http://localhost:9000/run\"\ntimeout_secs = 5\n",
            "inline",
        )
        .expect("valid TOML");
        assert_eq!(config.workflow.url, "http://localhost:9000/run");
        assert_eq!(config.workflow.timeout_secs, 5);
        assert_eq!(config.workflow.wid, WorkflowConfig::default().wid);
    }

    #[test]
    fn test_invalid_toml_reports_origin() {
        let err = parse("[workflow\nurl = 1", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let mut config = Config::default();
        apply_overrides(&mut config, |key| match key {
            ENV_WORKFLOW_TOKEN => Some("secret".to_string()),
            ENV_MOCK_DIR => Some("/tmp/json_files".to_string()),
            _ => None,
        });
        assert_eq!(config.workflow.token, "secret");
        assert_eq!(config.mock.dir, Some(PathBuf::from("/tmp/json_files")));
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_log_level_names() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.min_level(), LogLevel::Info);
        logging.level = "WARN".to_string();
        assert_eq!(logging.min_level(), LogLevel::Warning);
        logging.level = "verbose".to_string();
        assert_eq!(logging.min_level(), LogLevel::Info);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load(Some(Path::new("/nonexistent/inflow.toml"))).expect("defaults");
        assert_eq!(config.pictures.hourly_forecast_product, "1382");
    }
}
