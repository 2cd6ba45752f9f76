use serde::Deserialize;

use crate::error::{IntegrationError, IntegrationResult};

/// Environment prefix; `RUDDER__LOG_LEVEL=debug` sets `log_level`.
pub const ENV_PREFIX: &str = "RUDDER";

/// Verbosity of the host SDK. Ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "trace",
        }
    }

    pub fn is_debug(&self) -> bool {
        *self >= LogLevel::Debug
    }
}

/// Host client configuration handed to every integration at construction.
/// Loaded from environment variables with the prefix `RUDDER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_track_lifecycle_events")]
    pub track_lifecycle_events: bool,
}

fn default_log_level() -> LogLevel {
    LogLevel::Error
}
fn default_app_version() -> String {
    "unknown".to_string()
}
fn default_track_lifecycle_events() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            app_version: default_app_version(),
            track_lifecycle_events: default_track_lifecycle_events(),
        }
    }
}

impl HostConfig {
    /// Read the host configuration from `RUDDER__*` variables. Unset keys
    /// keep their defaults; unparsable values are a configuration error.
    pub fn load() -> IntegrationResult<Self> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|source| source.try_deserialize())
            .map_err(|e| IntegrationError::Config(format!("host config: {e}")))
    }
}
