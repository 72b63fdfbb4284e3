//! Handshake half of the popup state machine.

use super::core::{body, PopupBridge};
use crate::domain::{ConnectionState, HandledEvent, IgnoreReason, InboundOutcome, PendingHandshake};
use crate::ports::StatusKind;
use crate::service::messenger::Targets;
use shared_types::{BridgeError, HandshakeRequestData, MessageEnvelope, MessageType, WindowRef};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl PopupBridge {
    pub(crate) fn start_handshake(&mut self) -> Result<PendingHandshake, BridgeError> {
        if self.session.is_closed() {
            return Err(BridgeError::SessionClosed);
        }
        if self.session.state().has_peer() {
            return Err(BridgeError::AlreadyConnected);
        }

        let Some(opener) = self.ports.host.opener().filter(|w| !w.is_closed()) else {
            warn!("No opener window reachable");
            self.report("No opener window found", StatusKind::Error);
            return Err(BridgeError::NoPeer);
        };

        let request_id = self.ids.generate();
        let now = self.now();
        let envelope = MessageEnvelope::new(
            MessageType::HandshakeRequest,
            request_id.clone(),
            body(&HandshakeRequestData::default())?,
        )
        .with_expiry(now + self.config.handshake_ttl());

        // A failed send leaves the session exactly as it was.
        if let Err(e) = self
            .messenger
            .send(envelope, Targets::opener(Some(opener)), now)
        {
            self.report("Could not reach the application", StatusKind::Error);
            return Err(e);
        }

        self.session.begin_handshake(request_id.clone())?;
        info!(request_id = %request_id, "Handshake initiated");
        self.report("Connecting to application...", StatusKind::Pending);

        Ok(PendingHandshake {
            request_id,
            timeout: self.config.handshake_timeout(),
        })
    }

    pub(crate) fn handle_handshake_response(
        &mut self,
        envelope: &MessageEnvelope,
        source: Option<WindowRef>,
    ) -> InboundOutcome {
        let state = self.session.state();
        if state != ConnectionState::HandshakeInitiated {
            debug!(state = %state, "Handshake response outside handshake, ignored");
            return InboundOutcome::Ignored(IgnoreReason::UnexpectedState {
                message_type: envelope.message_type.clone(),
                state: state.to_string(),
            });
        }
        if !self.session.is_pending(&envelope.request_id) {
            debug!(request_id = %envelope.request_id, "Handshake response for unknown request");
            return InboundOutcome::Ignored(IgnoreReason::RequestIdMismatch);
        }
        let Some(source) = source else {
            warn!("Handshake response without source window");
            return InboundOutcome::Ignored(IgnoreReason::MissingSource);
        };

        if let Err(e) = self.session.connect(Arc::downgrade(&source)) {
            return InboundOutcome::Failed(e);
        }

        info!(request_id = %envelope.request_id, "Secure channel established");
        self.report("Connected. Waiting for tokens...", StatusKind::Pending);
        InboundOutcome::Handled(HandledEvent::HandshakeCompleted)
    }

    pub(crate) fn handle_handshake_timeout(&mut self, request_id: &str) -> Option<BridgeError> {
        // Timers are never cancelled; a stale one finds the session moved on.
        if self.session.state() != ConnectionState::HandshakeInitiated
            || !self.session.is_pending(request_id)
        {
            debug!(request_id = %request_id, "Stale handshake timer");
            return None;
        }

        if let Err(e) = self.session.transition_to(ConnectionState::Error) {
            return Some(e);
        }

        let err = BridgeError::HandshakeTimedOut {
            timeout_secs: self.config.handshake_timeout_secs,
        };
        warn!(request_id = %request_id, "Handshake timed out");
        self.report("Connection timed out. Please try again.", StatusKind::Error);
        Some(err)
    }
}
