//! # Protocol Session
//!
//! The single live popup session. All mutation goes through methods that keep
//! the peer invariant: a peer is recorded iff the state is `Connected` or
//! `TokensReceived`.

use super::state::ConnectionState;
use shared_types::{BridgeError, WeakWindowRef, WindowRef};
use std::sync::Weak;

/// Popup-side session state.
#[derive(Debug)]
pub struct ProtocolSession {
    pub(crate) state: ConnectionState,
    pub(crate) peer: Option<WeakWindowRef>,
    pub(crate) sender_origin: String,
    pub(crate) pending_request_id: Option<String>,
    pub(crate) closed: bool,
}

impl ProtocolSession {
    /// Create a fresh session trusting `sender_origin`.
    pub fn new(sender_origin: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            peer: None,
            sender_origin: sender_origin.into(),
            pending_request_id: None,
            closed: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The only origin this session trusts.
    pub fn sender_origin(&self) -> &str {
        &self.sender_origin
    }

    /// Correlation id of the outstanding handshake request.
    pub fn pending_request_id(&self) -> Option<&str> {
        self.pending_request_id.as_deref()
    }

    /// The handshaken peer, if it is still alive.
    pub fn peer(&self) -> Option<WindowRef> {
        self.peer.as_ref().and_then(Weak::upgrade)
    }

    /// Whether a peer reference is recorded (alive or not).
    pub fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    /// Whether `disconnect()` has torn the session down.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Move to `next`, enforcing the transition graph.
    pub fn transition_to(&mut self, next: ConnectionState) -> Result<(), BridgeError> {
        if !self.state.can_transition_to(next) {
            return Err(BridgeError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        if !next.has_peer() {
            self.peer = None;
        }
        if matches!(next, ConnectionState::Disconnected | ConnectionState::Error) {
            self.pending_request_id = None;
        }
        Ok(())
    }

    /// Record a sent handshake request.
    pub(crate) fn begin_handshake(&mut self, request_id: String) -> Result<(), BridgeError> {
        self.transition_to(ConnectionState::HandshakeInitiated)?;
        self.pending_request_id = Some(request_id);
        Ok(())
    }

    /// Whether `request_id` answers the outstanding handshake.
    pub(crate) fn is_pending(&self, request_id: &str) -> bool {
        self.pending_request_id.as_deref() == Some(request_id)
    }

    /// Complete the handshake with `peer`.
    pub(crate) fn connect(&mut self, peer: WeakWindowRef) -> Result<(), BridgeError> {
        self.transition_to(ConnectionState::Connected)?;
        self.peer = Some(peer);
        self.pending_request_id = None;
        Ok(())
    }

    /// Tear the session down. Idempotent.
    pub(crate) fn close(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.peer = None;
        self.pending_request_id = None;
        self.closed = true;
    }
}
