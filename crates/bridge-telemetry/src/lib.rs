//! # Bridge Telemetry
//!
//! Structured logging for the token bridge.
//!
//! The bridge crates only emit `tracing` events; this crate decides where they
//! go. Hosts call [`init_tracing`] once at start-up.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env().with_debug(bridge_config.debug);
//! init_tracing(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TB_LOG_LEVEL` / `RUST_LOG` | `info` (`debug` with the debug flag) | Filter directive |
//! | `TB_JSON_LOGS` | `false` | JSON output instead of pretty text |
//! | `TB_CONSOLE_OUTPUT` | `true` | Write events to stdout at all |
//! | `TB_SERVICE_NAME` | `token-bridge` | Service name in the start-up event |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod tracing_setup;

pub use config::{
    TelemetryConfig, DEFAULT_SERVICE_NAME, ENV_CONSOLE_OUTPUT, ENV_JSON_LOGS, ENV_LOG_LEVEL,
    ENV_SERVICE_NAME,
};
pub use tracing_setup::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}
