//! # TOML Configuration
//!
//! Loads [`BridgeConfig`] from a TOML file and applies environment overrides.
//!
//! ## Config File Format
//!
//! ```toml
//! sender_origin = "https://app.example.com"
//! debug = false
//! handshake_timeout_secs = 30
//! handshake_start_delay_secs = 1
//! request_id_length = 32
//! transfer_ttl_secs = 60
//! handshake_response_policy = "require_timestamp"
//! ```

use crate::domain::{BridgeConfig, ConfigError};
use std::fs;
use std::path::Path;

/// Environment variable overriding `sender_origin`.
pub const ENV_SENDER_ORIGIN: &str = "TB_SENDER_ORIGIN";

/// Environment variable overriding `debug`.
pub const ENV_DEBUG: &str = "TB_DEBUG";

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "TB_CONFIG";

/// TOML-based configuration loader.
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<BridgeConfig, ConfigError> {
        let config: BridgeConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from the process environment.
    ///
    /// Starts from the file named by `TB_CONFIG` (or `fallback` when unset),
    /// then applies `TB_SENDER_ORIGIN` and `TB_DEBUG`.
    pub fn from_env(fallback: BridgeConfig) -> Result<BridgeConfig, ConfigError> {
        Self::resolve(fallback, |key| std::env::var(key).ok())
    }

    /// [`TomlConfigLoader::from_env`] over an arbitrary variable lookup.
    pub fn resolve(
        fallback: BridgeConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<BridgeConfig, ConfigError> {
        let mut config = match lookup(ENV_CONFIG_PATH) {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            None => fallback,
        };

        if let Some(origin) = lookup(ENV_SENDER_ORIGIN) {
            config.sender_origin = origin;
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            config.debug = parse_flag(&debug);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
