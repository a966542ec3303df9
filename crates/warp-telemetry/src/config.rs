//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "warp-route".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WR_SERVICE_NAME`: Service name (default: warp-route)
    /// - `WR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `WR_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `WR_JSON_LOGS`: Enable JSON logs (default: false outside containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("WR_SERVICE_NAME").unwrap_or_else(|_| "warp-route".to_string()),

            log_level: env::var("WR_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("WR_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            json_logs: env::var("WR_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
