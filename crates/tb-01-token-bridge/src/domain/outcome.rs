//! # Inbound Outcomes
//!
//! What happened to one inbound message. Nothing here is raised to the host:
//! drops are silent, failures have already been reported to the status sink.

use shared_types::{BridgeError, Rejection};
use std::time::Duration;

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Rejected by the validator.
    Dropped(Rejection),
    /// Valid, but not applicable to the current session.
    Ignored(IgnoreReason),
    /// Processed.
    Handled(HandledEvent),
    /// Processed and failed; already reported.
    Failed(BridgeError),
}

impl InboundOutcome {
    /// Whether the message changed the session or produced a reply.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Why a valid message had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The tag is not one of the protocol's tags.
    UnknownType(String),
    /// This side does not consume the tag.
    NotForThisSide(String),
    /// The tag is not acceptable in the current state.
    UnexpectedState {
        /// Wire tag.
        message_type: String,
        /// Session state at arrival.
        state: String,
    },
    /// The correlation id does not match the outstanding request.
    RequestIdMismatch,
    /// The platform supplied no source window to reply to.
    MissingSource,
    /// The session was disconnected.
    SessionClosed,
}

/// A processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledEvent {
    /// Popup: trusted peer recorded.
    HandshakeCompleted,
    /// Popup: tokens stored. `acknowledged` is false if the ack could not be sent.
    TokensReceived {
        /// Whether `TOKEN_RECEIVED` was dispatched.
        acknowledged: bool,
    },
    /// Opener: handshake request answered.
    HandshakeAnswered,
    /// Opener: transfer acknowledged by the popup.
    TransferAcknowledged,
}

/// A handshake request that went out; the host arms a timer for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHandshake {
    /// Correlation id of the request.
    pub request_id: String,
    /// When `on_handshake_timeout` should fire.
    pub timeout: Duration,
}
