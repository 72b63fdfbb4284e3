//! # Bridge Configuration
//!
//! Hosting configuration plus protocol tunables.

use serde::{Deserialize, Serialize};
use shared_types::{HandshakeResponsePolicy, DEFAULT_REQUEST_ID_LENGTH};
use std::time::Duration;
use thiserror::Error;

/// Default handshake timeout in seconds.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

/// Default delay between start-up and the first handshake request, in seconds.
pub const DEFAULT_HANDSHAKE_START_DELAY_SECS: u64 = 1;

/// Default lifetime of outbound envelopes that carry an expiry, in seconds.
pub const DEFAULT_TRANSFER_TTL_SECS: u64 = 60;

/// Upper bound for every timeout and TTL, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The trusted origin is unusable.
    #[error("invalid sender origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// Offending value.
        origin: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A timeout or TTL is out of range.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Request id length is out of range.
    #[error("invalid request id length: {0}")]
    InvalidRequestIdLength(usize),

    /// Config file could not be read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        error: String,
    },

    /// Config file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// The only origin messages are accepted from and sent to.
    pub sender_origin: String,
    /// Emit diagnostics for silently dropped messages.
    pub debug: bool,
    /// Handshake response deadline.
    pub handshake_timeout_secs: u64,
    /// Delay before the hosting loop sends the first handshake request.
    pub handshake_start_delay_secs: u64,
    /// Length of generated correlation ids.
    pub request_id_length: usize,
    /// Lifetime stamped as `expiresAt` on outbound envelopes.
    pub transfer_ttl_secs: u64,
    /// Checks applied to `HANDSHAKE_RESPONSE`.
    pub handshake_response_policy: HandshakeResponsePolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sender_origin: String::new(),
            debug: false,
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            handshake_start_delay_secs: DEFAULT_HANDSHAKE_START_DELAY_SECS,
            request_id_length: DEFAULT_REQUEST_ID_LENGTH,
            transfer_ttl_secs: DEFAULT_TRANSFER_TTL_SECS,
            handshake_response_policy: HandshakeResponsePolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Default configuration trusting `sender_origin`.
    pub fn new(sender_origin: impl Into<String>) -> Self {
        Self {
            sender_origin: sender_origin.into(),
            ..Self::default()
        }
    }

    /// Enable or disable debug diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the handshake response policy.
    #[must_use]
    pub fn with_handshake_response_policy(mut self, policy: HandshakeResponsePolicy) -> Self {
        self.handshake_response_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_origin(&self.sender_origin)?;

        if self.handshake_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "handshake_timeout_secs cannot be 0".into(),
            ));
        }

        if self.transfer_ttl_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "transfer_ttl_secs cannot be 0".into(),
            ));
        }

        if self.handshake_timeout_secs > MAX_TIMEOUT_SECS
            || self.handshake_start_delay_secs > MAX_TIMEOUT_SECS
            || self.transfer_ttl_secs > MAX_TIMEOUT_SECS
        {
            return Err(ConfigError::InvalidTimeout(format!(
                "timeouts cannot exceed {MAX_TIMEOUT_SECS}s"
            )));
        }

        if self.request_id_length == 0 {
            return Err(ConfigError::InvalidRequestIdLength(self.request_id_length));
        }

        Ok(())
    }

    /// Handshake response deadline.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Delay before the first handshake request.
    pub fn handshake_start_delay(&self) -> Duration {
        Duration::from_secs(self.handshake_start_delay_secs)
    }

    /// Lifetime of outbound envelopes.
    pub fn transfer_ttl(&self) -> chrono::Duration {
        signed_seconds(self.transfer_ttl_secs)
    }

    /// Handshake deadline as a signed duration, for `expiresAt`.
    pub fn handshake_ttl(&self) -> chrono::Duration {
        signed_seconds(self.handshake_timeout_secs)
    }
}

fn signed_seconds(secs: u64) -> chrono::Duration {
    // Clamped so an unvalidated config cannot overflow.
    chrono::Duration::seconds(secs.min(MAX_TIMEOUT_SECS) as i64)
}

/// An origin is `scheme://host[:port]` with an http(s) scheme and nothing after
/// the authority.
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let invalid = |reason| {
        Err(ConfigError::InvalidOrigin {
            origin: origin.to_string(),
            reason,
        })
    };

    if origin.is_empty() {
        return invalid("origin is empty");
    }
    if origin == "*" {
        return invalid("wildcard origin is not allowed");
    }

    let Some((scheme, authority)) = origin.split_once("://") else {
        return invalid("missing scheme");
    };
    if scheme != "http" && scheme != "https" {
        return invalid("scheme must be http or https");
    }
    if authority.is_empty() {
        return invalid("missing host");
    }
    if authority.contains(['/', '?', '#']) {
        return invalid("origin must not carry a path, query or fragment");
    }

    Ok(())
}
