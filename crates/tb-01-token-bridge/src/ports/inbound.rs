//! # Inbound Ports
//!
//! The operation sets the hosting page drives.

use crate::domain::{
    ConnectionState, InboundOutcome, PendingHandshake, ResponderState,
};
use shared_types::{BridgeError, MessageEvent, TokenPair, TokenTransferData, TransferContext};

/// Observer invoked once with the received tokens.
pub type TokenObserver = Box<dyn FnOnce(TokenPair, TransferContext) + Send>;

/// Popup-side bridge API.
pub trait PopupBridgeApi {
    /// Send a handshake request to the opener.
    ///
    /// The host must call [`PopupBridgeApi::on_handshake_timeout`] once the
    /// returned timeout has elapsed.
    fn initiate(&mut self) -> Result<PendingHandshake, BridgeError>;

    /// Process one inbound event.
    fn handle_message(&mut self, event: MessageEvent) -> InboundOutcome;

    /// Handshake timer for `request_id` fired.
    ///
    /// Returns the reported error if the session moved to `Error`; a no-op
    /// otherwise.
    fn on_handshake_timeout(&mut self, request_id: &str) -> Option<BridgeError>;

    /// Register the token observer, replacing any previous one.
    fn on_tokens(&mut self, observer: TokenObserver);

    /// Tear down the session. Idempotent and terminal.
    fn disconnect(&mut self);

    /// Current state.
    fn state(&self) -> ConnectionState;

    /// Whether the channel is established.
    fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Connected | ConnectionState::TokensReceived
        )
    }

    /// Whether tokens were received.
    fn has_received_tokens(&self) -> bool {
        self.state() == ConnectionState::TokensReceived
    }

    /// Correlation id of the outstanding handshake.
    fn pending_request_id(&self) -> Option<&str>;
}

/// Opener-side responder API.
pub trait OpenerBridgeApi {
    /// Process one inbound event.
    fn handle_message(&mut self, event: MessageEvent) -> InboundOutcome;

    /// Send tokens to the handshaken popup. Returns the transfer's request id.
    fn send_tokens(&mut self, transfer: &TokenTransferData) -> Result<String, BridgeError>;

    /// Tear down the responder. Idempotent and terminal.
    fn disconnect(&mut self);

    /// Current state.
    fn state(&self) -> ResponderState;

    /// Whether a popup is handshaken.
    fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            ResponderState::Connected | ResponderState::TokensDelivered
        )
    }

    /// Whether the popup acknowledged a transfer.
    fn tokens_delivered(&self) -> bool {
        self.state() == ResponderState::TokensDelivered
    }
}
