//! # Error Types
//!
//! Caller-visible failures of the bridge, and the failure classes they belong to.
//!
//! Silently dropped inbound traffic is *not* represented here; see
//! [`crate::security::Rejection`].

use thiserror::Error;

/// How a failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Reported to the UI layer; the session stays usable or needs a manual retry.
    Recoverable,
    /// An operation was invoked in a state that cannot serve it. Rejected without side effects.
    ProgrammerError,
}

/// Failure of the underlying window dispatch primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The target window has been closed.
    #[error("target window is closed")]
    WindowClosed,

    /// The payload could not be serialized.
    #[error("payload could not be serialized: {0}")]
    Serialization(String),

    /// The platform refused the message.
    #[error("platform refused message: {0}")]
    Refused(String),
}

/// Errors returned by bridge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// No opener window is reachable from this context.
    #[error("no opener window is reachable")]
    NoPeer,

    /// Neither the opener nor a handshaken peer is available for this message.
    #[error("no target window for {message_type}")]
    NoTarget {
        /// Wire tag of the message that could not be routed.
        message_type: String,
    },

    /// The window dispatch primitive failed.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// No handshake response arrived in time.
    #[error("handshake timed out after {timeout_secs}s")]
    HandshakeTimedOut {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// A transfer arrived without both tokens.
    #[error("invalid token payload")]
    InvalidTokenPayload,

    /// The token store refused the tokens.
    #[error("token store rejected the tokens")]
    StoreRejected,

    /// The operation needs an established channel.
    #[error("channel is not connected (state: {state})")]
    NotConnected {
        /// State the session was in.
        state: String,
    },

    /// A handshake was requested on an already established channel.
    #[error("channel is already connected")]
    AlreadyConnected,

    /// The session was torn down with `disconnect()`.
    #[error("session has been disconnected")]
    SessionClosed,

    /// A state transition outside the allowed graph was attempted.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted state.
        to: String,
    },
}

impl BridgeError {
    /// The failure class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            BridgeError::NoPeer
            | BridgeError::NoTarget { .. }
            | BridgeError::Dispatch(_)
            | BridgeError::HandshakeTimedOut { .. }
            | BridgeError::InvalidTokenPayload
            | BridgeError::StoreRejected => ErrorClass::Recoverable,
            BridgeError::NotConnected { .. }
            | BridgeError::AlreadyConnected
            | BridgeError::SessionClosed
            | BridgeError::InvalidTransition { .. } => ErrorClass::ProgrammerError,
        }
    }

    /// Returns true if a manual retry may succeed.
    pub fn is_recoverable(&self) -> bool {
        self.class() == ErrorClass::Recoverable
    }
}
