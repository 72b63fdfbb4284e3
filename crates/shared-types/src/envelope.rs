//! # `MessageEnvelope`
//!
//! The wire wrapper for every cross-context message exchanged between the popup
//! and the window that opened it.
//!
//! ## Wire Shape
//!
//! ```text
//! { type: "HANDSHAKE_REQUEST" | "HANDSHAKE_RESPONSE" | "TOKEN_TRANSFER" | "TOKEN_RECEIVED",
//!   requestId: string,
//!   data: <type-specific>,
//!   metadata: { timestamp: ISO8601, sender: origin, expiresAt?: ISO8601 } }
//! ```
//!
//! Inbound envelopes are decoded leniently: every field has a default so that a
//! missing `type` or missing metadata reaches the validator as a typed rejection
//! instead of a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed tag set carried in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Popup → opener: open the channel.
    HandshakeRequest,
    /// Opener → popup: channel accepted.
    HandshakeResponse,
    /// Opener → popup: token material.
    TokenTransfer,
    /// Popup → opener: acknowledgment of a transfer.
    TokenReceived,
}

impl MessageType {
    /// All tags, in protocol order.
    pub const ALL: [MessageType; 4] = [
        MessageType::HandshakeRequest,
        MessageType::HandshakeResponse,
        MessageType::TokenTransfer,
        MessageType::TokenReceived,
    ];

    /// The tag as it appears on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageType::HandshakeRequest => "HANDSHAKE_REQUEST",
            MessageType::HandshakeResponse => "HANDSHAKE_RESPONSE",
            MessageType::TokenTransfer => "TOKEN_TRANSFER",
            MessageType::TokenReceived => "TOKEN_RECEIVED",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope metadata stamped by the sending side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// When the sender built the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// The sender's own origin, as claimed by the sender.
    /// Informational only: trust comes from the platform-supplied event origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Absolute expiry; the receiver rejects the message after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A cross-context message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    /// Wire tag. Kept as a string so that empty or unknown tags can be rejected
    /// by the validator rather than by the decoder.
    #[serde(rename = "type", default)]
    pub message_type: String,

    /// Correlates a request with its response or acknowledgment.
    #[serde(default)]
    pub request_id: String,

    /// Tag-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,

    /// Sender-stamped metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EnvelopeMetadata>,
}

impl MessageEnvelope {
    /// Build an outbound envelope without metadata; the messenger stamps it on send.
    pub fn new(kind: MessageType, request_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message_type: kind.as_str().to_string(),
            request_id: request_id.into(),
            data,
            metadata: None,
        }
    }

    /// Set an absolute expiry on the envelope.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.metadata.get_or_insert_with(EnvelopeMetadata::default).expires_at = Some(expires_at);
        self
    }

    /// Decode an inbound payload. Only JSON objects are envelopes; serde would
    /// otherwise fill the fields of a sequence positionally.
    pub fn decode(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        if !raw.is_object() {
            return Err(serde::de::Error::custom("envelope must be a JSON object"));
        }
        serde_json::from_value(raw)
    }

    /// Encode for dispatch.
    pub fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// The parsed tag, if it is one of the known tags.
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::parse(&self.message_type)
    }

    /// Sender timestamp, if present.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(|m| m.timestamp)
    }

    /// Expiry, if present.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(|m| m.expires_at)
    }
}
