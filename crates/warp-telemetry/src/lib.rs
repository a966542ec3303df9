//! # Warp Telemetry
//!
//! Logging and metrics shared by every warp router in a process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warp_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     // routers now log through `tracing` and count into `REGISTRY`
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WR_SERVICE_NAME` | `warp-route` | Service name on log lines |
//! | `WR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `WR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `WR_JSON_LOGS` | `false` | JSON log lines (defaults on inside containers) |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, FAST_FILLS, MESSAGES_PROCESSED, REBALANCES, REGISTRY,
    ROUTER_ERRORS, TRANSFERS_RECEIVED, TRANSFERS_SENT, VAULT_SWEEPS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Configuration value rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Increment a counter, with label values when given.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
