//! # Window Port
//!
//! Abstraction over a browsing context that can receive cross-context messages.
//!
//! The platform owns two things the protocol relies on:
//! - the target-origin restriction on delivery, and
//! - the origin stamped on every inbound event.
//!
//! Implementations must honor both; the bridge never trusts the `sender` field
//! inside an envelope.

use crate::errors::DispatchError;
use std::fmt;
use std::sync::{Arc, Weak};

/// Strong reference to a window.
pub type WindowRef = Arc<dyn PeerWindow>;

/// Weak reference to a window; does not keep the counterpart alive.
pub type WeakWindowRef = Weak<dyn PeerWindow>;

/// A browsing context that accepts `postMessage`-style delivery.
pub trait PeerWindow: Send + Sync {
    /// Deliver `data` to this window if its origin equals `target_origin`.
    ///
    /// A mismatching origin is not an error: the platform silently drops the
    /// message. A closed window is.
    fn post_message(
        &self,
        data: serde_json::Value,
        target_origin: &str,
        source: &MessageSource,
    ) -> Result<(), DispatchError>;

    /// Whether the window has been closed.
    fn is_closed(&self) -> bool;
}

/// The sending side of a message, as the platform records it.
#[derive(Clone)]
pub struct MessageSource {
    /// Origin of the sending context.
    pub origin: String,
    /// The sending window, given to the receiver as `event.source`.
    pub window: Option<WindowRef>,
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSource")
            .field("origin", &self.origin)
            .field("has_window", &self.window.is_some())
            .finish()
    }
}

/// An inbound cross-context message event.
#[derive(Clone)]
pub struct MessageEvent {
    /// Platform-supplied origin of the sender. The only trust anchor.
    pub origin: String,
    /// Raw payload.
    pub data: serde_json::Value,
    /// The sending window, if the platform exposes it.
    pub source: Option<WindowRef>,
}

impl MessageEvent {
    /// Build an event without a source window.
    pub fn new(origin: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            origin: origin.into(),
            data,
            source: None,
        }
    }

    /// Attach the sending window.
    #[must_use]
    pub fn with_source(mut self, source: WindowRef) -> Self {
        self.source = Some(source);
        self
    }
}

impl fmt::Debug for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payload may hold tokens.
        f.debug_struct("MessageEvent")
            .field("origin", &self.origin)
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}
