//! # Message Payloads
//!
//! Type-specific `data` bodies for each envelope tag, plus the token types the
//! relay hands to the external store.
//!
//! Token strings are wrapped so that their memory is zeroed when dropped and
//! they never appear in `Debug` output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Protocol version announced in `HANDSHAKE_REQUEST`.
pub const PROTOCOL_VERSION: u16 = 1;

/// `HANDSHAKE_REQUEST` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequestData {
    /// Announced protocol version.
    pub version: u16,
}

impl Default for HandshakeRequestData {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
        }
    }
}

/// `HANDSHAKE_RESPONSE` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeResponseData {
    /// The opener is ready to transfer.
    pub ready: bool,
}

/// `TOKEN_RECEIVED` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReceivedData {
    /// Whether the popup stored the tokens.
    pub success: bool,
}

/// An access/refresh token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    access_token: String,
    refresh_token: String,
}

impl TokenPair {
    /// Create a token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// The access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The refresh token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Token fields as they arrive on the wire, before presence is checked.
#[derive(Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct IncomingTokens {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// `TOKEN_TRANSFER` body as received.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingTransfer {
    #[serde(default)]
    tokens: Option<IncomingTokens>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    issued_at: Option<DateTime<Utc>>,
}

/// Context that accompanies a token transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferContext {
    /// The user the tokens belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the tokens were issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

/// A validated `TOKEN_TRANSFER` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferData {
    /// The tokens.
    pub tokens: TokenPair,
    /// User and issuance context.
    pub context: TransferContext,
}

impl TokenTransferData {
    /// Extract a transfer body.
    ///
    /// Returns `None` when the body does not decode or either token is missing
    /// or empty.
    pub fn extract(data: &serde_json::Value) -> Option<Self> {
        let incoming = IncomingTransfer::deserialize(data).ok()?;
        let tokens = incoming.tokens.as_ref()?;
        let access = tokens.access_token.as_deref().filter(|t| !t.is_empty())?;
        let refresh = tokens.refresh_token.as_deref().filter(|t| !t.is_empty())?;

        Some(Self {
            tokens: TokenPair::new(access, refresh),
            context: TransferContext {
                user_id: incoming.user_id.clone(),
                issued_at: incoming.issued_at,
            },
        })
    }

    /// Encode as a wire body.
    pub fn to_value(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "tokens": {
                "accessToken": self.tokens.access_token(),
                "refreshToken": self.tokens.refresh_token(),
            }
        });
        if let Some(user_id) = &self.context.user_id {
            body["userId"] = serde_json::Value::String(user_id.clone());
        }
        if let Some(issued_at) = self.context.issued_at {
            body["issuedAt"] = serde_json::Value::String(issued_at.to_rfc3339());
        }
        body
    }
}

/// Metadata handed to the token store alongside the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    /// The user the tokens belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the tokens were issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    /// Origin the tokens came from (always the configured sender origin).
    pub source: String,
}
