//! # Connection State
//!
//! Lifecycle of a bridge session on either side of the channel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Popup-side connection state.
///
/// ```text
/// Disconnected ──initiate──> HandshakeInitiated ──response──> Connected ──transfer──> TokensReceived
///       ^                       │      ^                          │                       │
///       │                       │      └──── retry ─── Error <────┴───────────────────────┘
///       └──── disconnect (from any state) ────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// No channel. Initial, and terminal after `disconnect()`.
    #[default]
    Disconnected,
    /// Handshake request sent, awaiting the response.
    HandshakeInitiated,
    /// Trusted peer recorded; token transfers are accepted.
    Connected,
    /// Tokens stored and acknowledged.
    TokensReceived,
    /// Timeout or security failure. A retry starts a new handshake.
    Error,
}

impl ConnectionState {
    /// Check if transition to `target` state is valid.
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (_, Disconnected)
                | (_, Error)
                | (Disconnected, HandshakeInitiated)
                | (HandshakeInitiated, HandshakeInitiated)
                | (Error, HandshakeInitiated)
                | (HandshakeInitiated, Connected)
                | (Connected, TokensReceived)
        )
    }

    /// States in which a peer window is recorded.
    pub fn has_peer(&self) -> bool {
        matches!(self, Self::Connected | Self::TokensReceived)
    }

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::HandshakeInitiated => "HandshakeInitiated",
            Self::Connected => "Connected",
            Self::TokensReceived => "TokensReceived",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opener-side responder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResponderState {
    /// Waiting for a handshake request.
    #[default]
    Listening,
    /// Handshake answered; tokens may be sent.
    Connected,
    /// The popup acknowledged the transfer.
    TokensDelivered,
    /// Torn down with `disconnect()`.
    Disconnected,
}

impl ResponderState {
    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listening => "Listening",
            Self::Connected => "Connected",
            Self::TokensDelivered => "TokensDelivered",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for ResponderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
