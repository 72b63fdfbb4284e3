//! # Centralized Message Validation
//!
//! The single implementation of inbound message validation. Both sides of the
//! channel run every inbound event through [`validate_event`] before acting on it.
//!
//! ## Rules (in order)
//!
//! 1. **Origin**: the platform-supplied event origin must equal the configured
//!    origin exactly (scheme + host + port).
//! 2. **Tag**: the envelope must carry a non-empty `type`.
//! 3. **Metadata**: every tag except `HANDSHAKE_RESPONSE` must carry
//!    `metadata.timestamp` and `metadata.expiresAt`. What a `HANDSHAKE_RESPONSE`
//!    must carry is decided by [`HandshakeResponsePolicy`].
//! 4. **Freshness**: reject if `now > expiresAt`, if the timestamp is more than
//!    [`MAX_FUTURE_SKEW_SECS`] ahead, or older than [`MAX_AGE_SECS`].
//!
//! Every rejection is silent toward the peer. Callers only log it.

use crate::envelope::{MessageEnvelope, MessageType};
use crate::window::MessageEvent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum allowed clock skew for future timestamps (seconds).
pub const MAX_FUTURE_SKEW_SECS: i64 = 60;

/// Maximum age for valid timestamps (seconds). The replay window.
pub const MAX_AGE_SECS: i64 = 120;

// =============================================================================
// POLICY
// =============================================================================

/// Which checks apply to a `HANDSHAKE_RESPONSE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeResponsePolicy {
    /// No metadata required and no freshness checks. Matches peers that send
    /// bare handshake responses.
    Exempt,
    /// `metadata.timestamp` required; skew and replay checks apply. `expiresAt`
    /// is optional but enforced when present.
    #[default]
    RequireTimestamp,
}

// =============================================================================
// REJECTIONS
// =============================================================================

/// Why an inbound message was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Event origin differs from the configured origin.
    #[error("origin mismatch: expected {expected}, got {actual}")]
    OriginMismatch {
        /// Configured origin.
        expected: String,
        /// Platform-supplied origin.
        actual: String,
    },

    /// The payload does not decode as an envelope.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// Empty `type`.
    #[error("missing message type")]
    MissingType,

    /// `metadata.timestamp` required but absent.
    #[error("missing metadata.timestamp")]
    MissingTimestamp,

    /// `metadata.expiresAt` required but absent.
    #[error("missing metadata.expiresAt")]
    MissingExpiry,

    /// `now` is past `expiresAt`.
    #[error("message expired at {expires_at}")]
    Expired {
        /// Claimed expiry.
        expires_at: DateTime<Utc>,
        /// Receiver clock.
        now: DateTime<Utc>,
    },

    /// Timestamp too far ahead of the receiver clock.
    #[error("timestamp {timestamp} is ahead of {now} by more than {}s", MAX_FUTURE_SKEW_SECS)]
    FromFuture {
        /// Claimed timestamp.
        timestamp: DateTime<Utc>,
        /// Receiver clock.
        now: DateTime<Utc>,
    },

    /// Timestamp older than the replay window.
    #[error("timestamp {timestamp} is older than {}s at {now}", MAX_AGE_SECS)]
    Stale {
        /// Claimed timestamp.
        timestamp: DateTime<Utc>,
        /// Receiver clock.
        now: DateTime<Utc>,
    },
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Rule 1: exact origin equality.
pub fn validate_origin(configured_origin: &str, event_origin: &str) -> Result<(), Rejection> {
    if configured_origin != event_origin {
        return Err(Rejection::OriginMismatch {
            expected: configured_origin.to_string(),
            actual: event_origin.to_string(),
        });
    }
    Ok(())
}

/// Rule 4: freshness of whichever timestamps are present.
pub fn validate_freshness(
    timestamp: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    if let Some(expires_at) = expires_at {
        if now > expires_at {
            return Err(Rejection::Expired { expires_at, now });
        }
    }

    if let Some(timestamp) = timestamp {
        if timestamp - now > Duration::seconds(MAX_FUTURE_SKEW_SECS) {
            return Err(Rejection::FromFuture { timestamp, now });
        }
        if now - timestamp > Duration::seconds(MAX_AGE_SECS) {
            return Err(Rejection::Stale { timestamp, now });
        }
    }

    Ok(())
}

/// Validate a decoded envelope against rules 1 to 4.
pub fn validate(
    envelope: &MessageEnvelope,
    configured_origin: &str,
    event_origin: &str,
    now: DateTime<Utc>,
    policy: HandshakeResponsePolicy,
) -> Result<(), Rejection> {
    // 1. Origin
    validate_origin(configured_origin, event_origin)?;

    // 2. Tag
    if envelope.message_type.is_empty() {
        return Err(Rejection::MissingType);
    }

    let timestamp = envelope.timestamp();
    let expires_at = envelope.expires_at();

    // 3. Metadata presence
    if envelope.kind() == Some(MessageType::HandshakeResponse) {
        match policy {
            HandshakeResponsePolicy::Exempt => return Ok(()),
            HandshakeResponsePolicy::RequireTimestamp => {
                if timestamp.is_none() {
                    return Err(Rejection::MissingTimestamp);
                }
            }
        }
    } else {
        if timestamp.is_none() {
            return Err(Rejection::MissingTimestamp);
        }
        if expires_at.is_none() {
            return Err(Rejection::MissingExpiry);
        }
    }

    // 4. Freshness
    validate_freshness(timestamp, expires_at, now)
}

/// Validate a raw inbound event and decode its envelope.
///
/// The origin is checked before the payload is even decoded.
pub fn validate_event(
    event: &MessageEvent,
    configured_origin: &str,
    now: DateTime<Utc>,
    policy: HandshakeResponsePolicy,
) -> Result<MessageEnvelope, Rejection> {
    validate_origin(configured_origin, &event.origin)?;

    let envelope = MessageEnvelope::decode(event.data.clone())
        .map_err(|e| Rejection::Malformed(e.to_string()))?;

    validate(&envelope, configured_origin, &event.origin, now, policy)?;
    Ok(envelope)
}

// =============================================================================
// TESTS
// =============================================================================
