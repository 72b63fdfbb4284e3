//! # TB-01 Token Bridge
//!
//! Origin-validated token relay between a popup and the window that opened it.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A popup (typically hosting a login flow) and its opener establish a
//! short-lived trusted channel over cross-context messages, then the opener
//! hands the popup an access/refresh token pair:
//!
//! ```text
//! Popup                                   Opener
//!   │ ── HANDSHAKE_REQUEST  (requestId) ──> │
//!   │ <── HANDSHAKE_RESPONSE (requestId) ── │   popup: Connected
//!   │ <── TOKEN_TRANSFER    (tokens)    ─── │
//!   │ ── TOKEN_RECEIVED    (success)   ──>  │   popup: TokensReceived
//! ```
//!
//! ## Security Model
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Exact origin match | The platform-stamped event origin must equal the configured origin |
//! | Pinned target origin | Every send names the configured origin, never `*` |
//! | Freshness | `expiresAt`, 60s future skew and 120s replay window |
//! | Correlation | Handshake responses must echo the pending request id |
//! | State gating | Tokens are only accepted on an established channel |
//!
//! There is no message signing; origin and freshness are the whole trust model.
//!
//! ## Module Structure
//!
//! ```text
//! tb-01-token-bridge/
//! ├── domain/          # ConnectionState, ProtocolSession, BridgeConfig, outcomes
//! ├── ports/           # PopupBridgeApi, OpenerBridgeApi, TokenStore, StatusSink, ...
//! ├── service/         # PopupBridge, OpenerBridge, SecureMessenger, driver
//! └── adapters/        # In-memory store, status sinks, clocks, TOML config, host
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports
pub use adapters::{
    InMemoryTokenStore, InProcessHost, ManualTimeSource, RecordingStatusSink, SystemTimeSource,
    TomlConfigLoader, TracingStatusSink,
};
pub use domain::{
    BridgeConfig, ConfigError, ConnectionState, HandledEvent, IgnoreReason, InboundOutcome,
    PendingHandshake, ProtocolSession, ResponderState,
};
pub use ports::{
    BridgePorts, HostEnvironment, OpenerBridgeApi, PopupBridgeApi, StatusKind, StatusSink,
    TimeSource, TokenObserver, TokenStore,
};
pub use service::{
    run_opener, run_popup, DriverControl, DriverHandle, OpenerBridge, PopupBridge,
    SecureMessenger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
