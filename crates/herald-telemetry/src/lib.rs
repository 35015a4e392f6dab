//! # Herald Telemetry
//!
//! Structured logging for Block Herald through `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use herald_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HERALD_SERVICE_NAME` | `block-herald` | Service name |
//! | `HERALD_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `HERALD_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `HERALD_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
