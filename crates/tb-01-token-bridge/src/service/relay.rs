//! Token relay: store, acknowledge, notify.

use super::core::{body, PopupBridge};
use crate::domain::{ConnectionState, HandledEvent, IgnoreReason, InboundOutcome};
use crate::ports::StatusKind;
use crate::service::messenger::Targets;
use shared_types::{
    BridgeError, MessageEnvelope, MessageType, TokenMetadata, TokenReceivedData,
    TokenTransferData,
};
use tracing::{info, warn};

impl PopupBridge {
    pub(crate) fn handle_token_transfer(&mut self, envelope: &MessageEnvelope) -> InboundOutcome {
        let state = self.session.state();
        if state != ConnectionState::Connected {
            warn!(state = %state, "Token transfer without an established channel, dropped");
            return InboundOutcome::Ignored(IgnoreReason::UnexpectedState {
                message_type: envelope.message_type.clone(),
                state: state.to_string(),
            });
        }

        let Some(transfer) = TokenTransferData::extract(&envelope.data) else {
            warn!(request_id = %envelope.request_id, "Invalid token payload");
            self.report("Invalid token payload", StatusKind::Error);
            return InboundOutcome::Failed(BridgeError::InvalidTokenPayload);
        };

        let metadata = TokenMetadata {
            user_id: transfer.context.user_id.clone(),
            issued_at: transfer.context.issued_at,
            source: self.session.sender_origin().to_string(),
        };
        if !self.store.store_tokens(&transfer.tokens, &metadata) {
            warn!(request_id = %envelope.request_id, "Token store rejected tokens");
            self.report("Failed to store tokens", StatusKind::Error);
            return InboundOutcome::Failed(BridgeError::StoreRejected);
        }

        if let Err(e) = self.session.transition_to(ConnectionState::TokensReceived) {
            return InboundOutcome::Failed(e);
        }
        info!(request_id = %envelope.request_id, "Tokens received");
        self.report("Tokens received", StatusKind::Success);

        let acknowledged = self.acknowledge(&envelope.request_id);

        if let Some(observer) = self.observer.take() {
            let TokenTransferData { tokens, context } = transfer;
            observer(tokens, context);
        }

        InboundOutcome::Handled(HandledEvent::TokensReceived { acknowledged })
    }

    fn acknowledge(&self, request_id: &str) -> bool {
        let now = self.now();
        let result = body(&TokenReceivedData { success: true }).and_then(|data| {
            let ack = MessageEnvelope::new(MessageType::TokenReceived, request_id, data)
                .with_expiry(now + self.config.transfer_ttl());
            self.messenger
                .send(ack, Targets::peer(self.session.peer()), now)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Acknowledgment not sent");
                self.report("Tokens stored but acknowledgment failed", StatusKind::Error);
                false
            }
        }
    }
}
