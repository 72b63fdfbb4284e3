//! # Outbound Ports
//!
//! Traits for the bridge's collaborators: the hosting window, the token store,
//! the UI status sink and the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_bus::Subscription;
use shared_types::{TokenMetadata, TokenPair, WindowRef};
use std::fmt;
use std::sync::Arc;

/// The browsing context the bridge runs in.
pub trait HostEnvironment: Send + Sync {
    /// Origin of this context, stamped as `metadata.sender`.
    fn own_origin(&self) -> String;

    /// The window that opened this one, if reachable.
    fn opener(&self) -> Option<WindowRef>;

    /// This window, handed to receivers as `event.source`.
    fn this_window(&self) -> Option<WindowRef>;

    /// Register a message listener on this window.
    fn subscribe(&self) -> Subscription;
}

/// Token store contract.
///
/// The bridge only writes; the read operations exist for hosts.
pub trait TokenStore: Send + Sync {
    /// Store tokens. Returns false if the store refused them.
    fn store_tokens(&self, tokens: &TokenPair, metadata: &TokenMetadata) -> bool;

    /// Whether tokens are held.
    fn has_tokens(&self) -> bool;

    /// Metadata of the held tokens.
    fn token_metadata(&self) -> Option<TokenMetadata>;

    /// Discard held tokens.
    fn clear_tokens(&self);
}

/// Status kinds understood by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Work in progress.
    Pending,
    /// Completed.
    Success,
    /// Failed; the user may retry.
    Error,
}

impl StatusKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI status sink.
pub trait StatusSink: Send + Sync {
    /// Show a status line.
    fn update(&self, message: &str, kind: StatusKind);
}

/// Abstract interface for time.
///
/// Injected so that freshness checks are deterministic under test.
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Collaborators shared by both bridge roles.
#[derive(Clone)]
pub struct BridgePorts {
    /// Hosting window.
    pub host: Arc<dyn HostEnvironment>,
    /// UI status sink.
    pub status: Arc<dyn StatusSink>,
    /// Clock.
    pub time: Arc<dyn TimeSource>,
}

impl BridgePorts {
    /// Bundle collaborators.
    pub fn new(
        host: Arc<dyn HostEnvironment>,
        status: Arc<dyn StatusSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self { host, status, time }
    }
}

impl fmt::Debug for BridgePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgePorts")
            .field("origin", &self.host.own_origin())
            .finish_non_exhaustive()
    }
}
