//! # In-Process Window
//!
//! A browsing context simulated in memory. Delivery honors the target-origin
//! restriction and stamps the sender's origin the way a browser does, so the
//! bridge can run against it unchanged.

use crate::subscriber::{ListenerRegistry, Subscription};
use shared_types::{DispatchError, MessageEvent, MessageSource, PeerWindow, WindowRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Wildcard target origin. Accepted on delivery, never used by the bridge.
pub const ANY_ORIGIN: &str = "*";

/// An in-memory window with an origin, an optional opener and listeners.
pub struct InProcessWindow {
    origin: String,
    opener: Option<Weak<InProcessWindow>>,
    closed: AtomicBool,
    listeners: Arc<ListenerRegistry>,
    this: Weak<InProcessWindow>,
}

impl InProcessWindow {
    /// Create a top-level window without an opener.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Arc<Self> {
        Self::build(origin.into(), None)
    }

    /// Open a child window whose opener is `self`.
    #[must_use]
    pub fn open_popup(self: &Arc<Self>, origin: impl Into<String>) -> Arc<Self> {
        let popup = Self::build(origin.into(), Some(Arc::downgrade(self)));
        debug!(opener = %self.origin, popup = %popup.origin, "Popup opened");
        popup
    }

    fn build(origin: String, opener: Option<Weak<InProcessWindow>>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            origin,
            opener,
            closed: AtomicBool::new(false),
            listeners: ListenerRegistry::new(),
            this: this.clone(),
        })
    }

    /// Origin of this window.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The window that opened this one, if it is still alive.
    pub fn opener(&self) -> Option<Arc<InProcessWindow>> {
        self.opener.as_ref().and_then(Weak::upgrade)
    }

    /// This window as a trait object.
    pub fn as_window_ref(self: &Arc<Self>) -> WindowRef {
        Arc::clone(self) as WindowRef
    }

    /// How this window appears as the sender of a message.
    pub fn as_source(&self) -> MessageSource {
        MessageSource {
            origin: self.origin.clone(),
            window: self.this.upgrade().map(|w| w as WindowRef),
        }
    }

    /// Register a message listener.
    pub fn subscribe(&self) -> Subscription {
        self.listeners.subscribe()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    /// Close the window. Listeners are dropped and further delivery fails.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.listeners.clear();
            debug!(origin = %self.origin, "Window closed");
        }
    }
}

impl PeerWindow for InProcessWindow {
    fn post_message(
        &self,
        data: serde_json::Value,
        target_origin: &str,
        source: &MessageSource,
    ) -> Result<(), DispatchError> {
        if self.is_closed() {
            return Err(DispatchError::WindowClosed);
        }
        if target_origin != ANY_ORIGIN && target_origin != self.origin {
            trace!(
                target = %target_origin,
                actual = %self.origin,
                "Target origin mismatch, message dropped"
            );
            return Ok(());
        }

        let event = MessageEvent {
            origin: source.origin.clone(),
            data,
            source: source.window.clone(),
        };
        self.listeners.dispatch(&event);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for InProcessWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessWindow")
            .field("origin", &self.origin)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
