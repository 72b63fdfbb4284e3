//! Test doubles for the window port.
//!
//! `RecordingWindow` records what was posted to it instead of dispatching.

use parking_lot::Mutex;
use shared_types::{DispatchError, MessageSource, PeerWindow};
use std::sync::atomic::{AtomicBool, Ordering};

/// One recorded `post_message` call.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    /// Payload.
    pub data: serde_json::Value,
    /// Requested target origin.
    pub target_origin: String,
    /// Sender origin.
    pub source_origin: String,
}

/// Records every delivery attempt instead of dispatching.
#[derive(Debug)]
pub struct RecordingWindow {
    origin: String,
    sent: Mutex<Vec<PostedMessage>>,
    closed: AtomicBool,
    failure: Mutex<Option<DispatchError>>,
}

impl RecordingWindow {
    /// Open window at `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    /// Origin of this window.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every recorded call, oldest first.
    pub fn sent(&self) -> Vec<PostedMessage> {
        self.sent.lock().clone()
    }

    /// Mark closed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Fail every later `post_message` with `error`.
    pub fn fail_with(&self, error: DispatchError) {
        *self.failure.lock() = Some(error);
    }
}

impl PeerWindow for RecordingWindow {
    fn post_message(
        &self,
        data: serde_json::Value,
        target_origin: &str,
        source: &MessageSource,
    ) -> Result<(), DispatchError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        if self.is_closed() {
            return Err(DispatchError::WindowClosed);
        }
        self.sent.lock().push(PostedMessage {
            data,
            target_origin: target_origin.to_string(),
            source_origin: source.origin.clone(),
        });
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
