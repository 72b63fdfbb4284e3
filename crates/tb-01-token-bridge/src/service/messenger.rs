//! # Secure Messenger
//!
//! Stamps outbound envelopes and routes them to the right window, always
//! restricted to the configured origin.

use chrono::{DateTime, Utc};
use shared_types::{
    BridgeError, DispatchError, EnvelopeMetadata, MessageEnvelope, MessageSource, MessageType,
    WindowRef,
};
use tracing::{debug, warn};

/// Candidate targets for one send.
#[derive(Default)]
pub struct Targets {
    /// The opener window, used for `HANDSHAKE_REQUEST`.
    pub opener: Option<WindowRef>,
    /// The handshaken peer, used for every other tag.
    pub peer: Option<WindowRef>,
}

impl Targets {
    /// Only an opener.
    pub fn opener(opener: Option<WindowRef>) -> Self {
        Self { opener, peer: None }
    }

    /// Only a peer.
    pub fn peer(peer: Option<WindowRef>) -> Self {
        Self { opener: None, peer }
    }

    fn select(self, kind: Option<MessageType>) -> Option<WindowRef> {
        let target = match kind {
            Some(MessageType::HandshakeRequest) => self.opener,
            _ => self.peer,
        };
        target.filter(|window| !window.is_closed())
    }
}

/// Outbound half of the bridge.
pub struct SecureMessenger {
    own_origin: String,
    target_origin: String,
    this_window: Option<WindowRef>,
}

impl SecureMessenger {
    /// Create a messenger sending as `own_origin` to `target_origin` only.
    pub fn new(
        own_origin: impl Into<String>,
        target_origin: impl Into<String>,
        this_window: Option<WindowRef>,
    ) -> Self {
        Self {
            own_origin: own_origin.into(),
            target_origin: target_origin.into(),
            this_window,
        }
    }

    /// Origin every send is restricted to.
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// Stamp `envelope` and dispatch it.
    ///
    /// `metadata.timestamp` and `metadata.sender` are overwritten; an
    /// `expiresAt` already set by the caller is kept.
    pub fn send(
        &self,
        mut envelope: MessageEnvelope,
        targets: Targets,
        now: DateTime<Utc>,
    ) -> Result<(), BridgeError> {
        let kind = envelope.kind();
        let Some(target) = targets.select(kind) else {
            warn!(
                message_type = %envelope.message_type,
                request_id = %envelope.request_id,
                "No target window for message"
            );
            return Err(BridgeError::NoTarget {
                message_type: envelope.message_type,
            });
        };

        let metadata = envelope
            .metadata
            .get_or_insert_with(EnvelopeMetadata::default);
        metadata.timestamp = Some(now);
        metadata.sender = Some(self.own_origin.clone());

        let data = envelope
            .encode()
            .map_err(|e| DispatchError::Serialization(e.to_string()))?;
        let source = MessageSource {
            origin: self.own_origin.clone(),
            window: self.this_window.clone(),
        };

        if let Err(e) = target.post_message(data, &self.target_origin, &source) {
            warn!(
                message_type = %envelope.message_type,
                request_id = %envelope.request_id,
                error = %e,
                "Message dispatch failed"
            );
            return Err(e.into());
        }

        debug!(
            message_type = %envelope.message_type,
            request_id = %envelope.request_id,
            target_origin = %self.target_origin,
            "Message sent"
        );
        Ok(())
    }
}

impl std::fmt::Debug for SecureMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureMessenger")
            .field("own_origin", &self.own_origin)
            .field("target_origin", &self.target_origin)
            .finish_non_exhaustive()
    }
}
