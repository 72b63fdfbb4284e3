//! # Listener Registry
//!
//! The receiving side of a window: a set of message listeners, each backed by
//! an unbounded channel. A [`Subscription`] removes its listener when dropped.

use parking_lot::Mutex;
use shared_types::MessageEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The window that owned the listener is gone.
    #[error("window closed")]
    Closed,
}

/// Listener identifier, unique per registry.
pub type ListenerId = u64;

/// Registered message listeners of one window.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<ListenerId, mpsc::UnboundedSender<MessageEvent>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.listeners.lock().insert(id, sender);
        debug!(listener = id, "Listener registered");
        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(self),
        }
    }

    /// Deliver an event to every registered listener.
    ///
    /// Returns the number of listeners reached. Listeners whose receiving end
    /// is gone are pruned.
    pub fn dispatch(&self, event: &MessageEvent) -> usize {
        let mut listeners = self.listeners.lock();
        listeners.retain(|_, sender| sender.send(event.clone()).is_ok());
        trace!(delivered = listeners.len(), origin = %event.origin, "Event dispatched");
        listeners.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Drop every listener. Pending receivers observe the channel closing.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    fn remove(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }
}

/// A registered message listener.
///
/// When dropped, the listener is removed from its window.
pub struct Subscription {
    id: ListenerId,
    receiver: mpsc::UnboundedReceiver<MessageEvent>,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    /// Identifier of this listener.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next delivered event
    /// - `None` - The window was closed or dropped
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was queued
    /// - `Ok(None)` - Nothing queued
    /// - `Err(SubscriptionError::Closed)` - The window was closed or dropped
    pub fn try_recv(&mut self) -> Result<Option<MessageEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
        debug!(listener = self.id, "Listener removed");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
