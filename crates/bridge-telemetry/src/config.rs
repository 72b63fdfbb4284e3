//! Telemetry configuration from environment variables.

use std::env;

/// Filter directive variable, checked before `RUST_LOG`.
pub const ENV_LOG_LEVEL: &str = "TB_LOG_LEVEL";
/// JSON output toggle.
pub const ENV_JSON_LOGS: &str = "TB_JSON_LOGS";
/// Console output toggle.
pub const ENV_CONSOLE_OUTPUT: &str = "TB_CONSOLE_OUTPUT";
/// Service name override.
pub const ENV_SERVICE_NAME: &str = "TB_SERVICE_NAME";
/// Service name when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "token-bridge";

/// Where and how bridge logs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name recorded in the start-up event
    pub service_name: String,

    /// Explicit filter directive; overrides the debug flag when set
    pub log_level: Option<String>,

    /// The hosting bridge's debug flag
    pub debug: bool,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: None,
            debug: false,
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
    /// - `TB_SERVICE_NAME`: Service name (default: token-bridge)
    /// - `TB_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: derived from the debug flag)
    /// - `TB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TB_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            service_name: lookup(ENV_SERVICE_NAME)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            log_level: lookup(ENV_LOG_LEVEL)
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty()),

            debug: false,

            console_output: lookup(ENV_CONSOLE_OUTPUT)
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup(ENV_JSON_LOGS)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Carry over the hosting bridge's debug flag.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The directive handed to `EnvFilter`.
    pub fn filter_directive(&self) -> &str {
        match &self.log_level {
            Some(level) => level,
            None if self.debug => "debug",
            None => "info",
        }
    }
}
