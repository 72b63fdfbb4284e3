//! # Opener Bridge
//!
//! The opener's half of the channel: answers handshake requests from the popup
//! it opened and sends tokens once the popup is handshaken.

use super::core::body;
use crate::domain::{
    BridgeConfig, ConfigError, HandledEvent, IgnoreReason, InboundOutcome, ResponderState,
};
use crate::ports::{BridgePorts, OpenerBridgeApi, StatusKind};
use crate::service::messenger::{SecureMessenger, Targets};
use chrono::{DateTime, Utc};
use shared_bus::Subscription;
use shared_types::{
    validate_event, BridgeError, HandshakeResponseData, MessageEnvelope, MessageEvent,
    MessageType, RequestIdGenerator, TokenReceivedData, TokenTransferData, WeakWindowRef,
    WindowRef,
};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Opener-side responder.
pub struct OpenerBridge {
    state: ResponderState,
    peer: Option<WeakWindowRef>,
    awaiting_ack: Option<String>,
    config: BridgeConfig,
    messenger: SecureMessenger,
    ids: RequestIdGenerator,
    ports: BridgePorts,
    subscription: Option<Subscription>,
}

impl OpenerBridge {
    /// Create a responder trusting the popup origin in `config.sender_origin`.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration does not validate.
    pub fn new(config: BridgeConfig, ports: BridgePorts) -> Result<Self, ConfigError> {
        config.validate()?;

        let messenger = SecureMessenger::new(
            ports.host.own_origin(),
            config.sender_origin.clone(),
            ports.host.this_window(),
        );
        let subscription = ports.host.subscribe();
        info!(popup_origin = %config.sender_origin, "Opener bridge listening");

        Ok(Self {
            state: ResponderState::Listening,
            peer: None,
            awaiting_ack: None,
            ids: RequestIdGenerator::new(config.request_id_length),
            config,
            messenger,
            ports,
            subscription: Some(subscription),
        })
    }

    /// Request id of the transfer awaiting acknowledgment.
    pub fn awaiting_ack(&self) -> Option<&str> {
        self.awaiting_ack.as_deref()
    }

    /// The handshaken popup, if alive.
    pub fn peer(&self) -> Option<WindowRef> {
        self.peer.as_ref().and_then(Weak::upgrade)
    }

    /// Wait for the next inbound event.
    pub async fn next_event(&mut self) -> Option<MessageEvent> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => None,
        }
    }

    /// Handle every event already queued on the listener.
    pub fn pump(&mut self) -> Vec<InboundOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = self
            .subscription
            .as_mut()
            .and_then(|s| s.try_recv().ok().flatten())
        {
            outcomes.push(self.handle_message(event));
        }
        outcomes
    }

    fn report(&self, message: &str, kind: StatusKind) {
        self.ports.status.update(message, kind);
    }

    fn now(&self) -> DateTime<Utc> {
        self.ports.time.now()
    }

    fn handle_handshake_request(
        &mut self,
        envelope: &MessageEnvelope,
        source: Option<WindowRef>,
    ) -> InboundOutcome {
        let Some(source) = source else {
            warn!("Handshake request without source window");
            return InboundOutcome::Ignored(IgnoreReason::MissingSource);
        };

        let now = self.now();
        let response = body(&HandshakeResponseData { ready: true }).and_then(|data| {
            let envelope =
                MessageEnvelope::new(MessageType::HandshakeResponse, &envelope.request_id, data)
                    .with_expiry(now + self.config.transfer_ttl());
            self.messenger
                .send(envelope, Targets::peer(Some(Arc::clone(&source))), now)
        });
        if let Err(e) = response {
            self.report("Could not answer the popup", StatusKind::Error);
            return InboundOutcome::Failed(e);
        }

        // A repeated request means the popup retried; start over with it.
        self.peer = Some(Arc::downgrade(&source));
        self.awaiting_ack = None;
        self.state = ResponderState::Connected;
        info!(request_id = %envelope.request_id, "Handshake answered");
        self.report("Popup connected", StatusKind::Pending);
        InboundOutcome::Handled(HandledEvent::HandshakeAnswered)
    }

    fn handle_token_received(&mut self, envelope: &MessageEnvelope) -> InboundOutcome {
        if self.awaiting_ack.as_deref() != Some(envelope.request_id.as_str()) {
            debug!(request_id = %envelope.request_id, "Acknowledgment for unknown transfer");
            return InboundOutcome::Ignored(IgnoreReason::RequestIdMismatch);
        }

        let success = serde_json::from_value::<TokenReceivedData>(envelope.data.clone())
            .map(|ack| ack.success)
            .unwrap_or(false);
        self.awaiting_ack = None;

        if !success {
            warn!(request_id = %envelope.request_id, "Popup reported a failed transfer");
            self.report("Popup could not store the tokens", StatusKind::Error);
            return InboundOutcome::Failed(BridgeError::StoreRejected);
        }

        self.state = ResponderState::TokensDelivered;
        info!(request_id = %envelope.request_id, "Tokens delivered");
        self.report("Tokens delivered", StatusKind::Success);
        InboundOutcome::Handled(HandledEvent::TransferAcknowledged)
    }
}

impl OpenerBridgeApi for OpenerBridge {
    fn handle_message(&mut self, event: MessageEvent) -> InboundOutcome {
        if self.state == ResponderState::Disconnected {
            return InboundOutcome::Ignored(IgnoreReason::SessionClosed);
        }

        let envelope = match validate_event(
            &event,
            &self.config.sender_origin,
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
            Some(MessageType::HandshakeRequest) => {
                self.handle_handshake_request(&envelope, event.source)
            }
            Some(MessageType::TokenReceived) => self.handle_token_received(&envelope),
            Some(other) => {
                debug!(message_type = %other, "Message not consumed by the opener");
                InboundOutcome::Ignored(IgnoreReason::NotForThisSide(other.to_string()))
            }
            None => InboundOutcome::Ignored(IgnoreReason::UnknownType(envelope.message_type)),
        }
    }

    fn send_tokens(&mut self, transfer: &TokenTransferData) -> Result<String, BridgeError> {
        match self.state {
            ResponderState::Disconnected => return Err(BridgeError::SessionClosed),
            ResponderState::Connected => {}
            other => {
                return Err(BridgeError::NotConnected {
                    state: other.to_string(),
                })
            }
        }

        let request_id = self.ids.generate();
        let now = self.now();
        let envelope = MessageEnvelope::new(
            MessageType::TokenTransfer,
            request_id.clone(),
            transfer.to_value(),
        )
        .with_expiry(now + self.config.transfer_ttl());

        if let Err(e) = self.messenger.send(envelope, Targets::peer(self.peer()), now) {
            self.report("Failed to send tokens", StatusKind::Error);
            return Err(e);
        }

        self.awaiting_ack = Some(request_id.clone());
        info!(request_id = %request_id, "Tokens sent");
        self.report("Tokens sent, awaiting confirmation", StatusKind::Pending);
        Ok(request_id)
    }

    fn disconnect(&mut self) {
        if self.state == ResponderState::Disconnected {
            return;
        }
        self.subscription = None;
        self.peer = None;
        self.awaiting_ack = None;
        self.state = ResponderState::Disconnected;
        info!("Opener bridge disconnected");
    }

    fn state(&self) -> ResponderState {
        self.state
    }
}

impl std::fmt::Debug for OpenerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenerBridge")
            .field("state", &self.state)
            .field("awaiting_ack", &self.awaiting_ack)
            .finish_non_exhaustive()
    }
}
