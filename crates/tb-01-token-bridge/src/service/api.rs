use super::core::PopupBridge;
use crate::domain::{ConnectionState, IgnoreReason, InboundOutcome, PendingHandshake};
use crate::ports::{PopupBridgeApi, TokenObserver};
use shared_types::{validate_event, BridgeError, MessageEvent, MessageType};
use tracing::{debug, info};

impl PopupBridgeApi for PopupBridge {
    fn initiate(&mut self) -> Result<PendingHandshake, BridgeError> {
        self.start_handshake()
    }

    fn handle_message(&mut self, event: MessageEvent) -> InboundOutcome {
        if self.session.is_closed() {
            return InboundOutcome::Ignored(IgnoreReason::SessionClosed);
        }

        let envelope = match validate_event(
            &event,
            self.session.sender_origin(),
            self.now(),
            self.config.handshake_response_policy,
        ) {
            Ok(envelope) => envelope,
            Err(rejection) => {
                if self.config.debug {
                    debug!(origin = %event.origin, reason = %rejection, "Inbound message rejected");
                }
                return InboundOutcome::Dropped(rejection);
            }
        };

        match envelope.kind() {
            Some(MessageType::HandshakeResponse) => {
                self.handle_handshake_response(&envelope, event.source)
            }
            Some(MessageType::TokenTransfer) => self.handle_token_transfer(&envelope),
            Some(other) => {
                debug!(message_type = %other, "Message not consumed by the popup");
                InboundOutcome::Ignored(IgnoreReason::NotForThisSide(other.to_string()))
            }
            None => {
                debug!(message_type = %envelope.message_type, "Unknown message type");
                InboundOutcome::Ignored(IgnoreReason::UnknownType(envelope.message_type))
            }
        }
    }

    fn on_handshake_timeout(&mut self, request_id: &str) -> Option<BridgeError> {
        self.handle_handshake_timeout(request_id)
    }

    fn on_tokens(&mut self, observer: TokenObserver) {
        self.observer = Some(observer);
    }

    fn disconnect(&mut self) {
        if self.session.is_closed() {
            return;
        }
        // Dropping the subscription unregisters the listener.
        self.subscription = None;
        self.observer = None;
        self.session.close();
        info!("Popup bridge disconnected");
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }

    fn pending_request_id(&self) -> Option<&str> {
        self.session.pending_request_id()
    }
}
