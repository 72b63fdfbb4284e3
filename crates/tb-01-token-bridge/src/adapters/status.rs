//! Status sink adapters.

use crate::ports::{StatusKind, StatusSink};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Forwards status lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn update(&self, message: &str, kind: StatusKind) {
        match kind {
            StatusKind::Pending | StatusKind::Success => {
                info!(status = %kind, "{}", message)
            }
            StatusKind::Error => warn!(status = %kind, "{}", message),
        }
    }
}

/// Keeps every status line in memory.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    entries: Mutex<Vec<(String, StatusKind)>>,
}

impl RecordingStatusSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, oldest first.
    pub fn entries(&self) -> Vec<(String, StatusKind)> {
        self.entries.lock().clone()
    }

    /// Kinds of all recorded lines, oldest first.
    pub fn kinds(&self) -> Vec<StatusKind> {
        self.entries.lock().iter().map(|(_, kind)| *kind).collect()
    }

    /// The most recent line.
    pub fn last(&self) -> Option<(String, StatusKind)> {
        self.entries.lock().last().cloned()
    }

    /// Whether any line of `kind` was recorded.
    pub fn contains_kind(&self, kind: StatusKind) -> bool {
        self.entries.lock().iter().any(|(_, k)| *k == kind)
    }
}

impl StatusSink for RecordingStatusSink {
    fn update(&self, message: &str, kind: StatusKind) {
        self.entries.lock().push((message.to_string(), kind));
    }
}
