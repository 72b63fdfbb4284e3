use crate::domain::{BridgeConfig, ConfigError, InboundOutcome, ProtocolSession};
use crate::ports::{BridgePorts, StatusKind, TokenObserver, TokenStore};
use crate::service::messenger::SecureMessenger;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_bus::Subscription;
use shared_types::{BridgeError, DispatchError, MessageEvent, RequestIdGenerator};
use std::sync::Arc;
use tracing::info;

/// Popup-side token bridge.
///
/// Owns the [`ProtocolSession`] and drives it from inbound events. The bridge
/// subscribes to its host window on construction; `disconnect()` drops the
/// subscription.
///
/// # Example
///
/// ```rust,ignore
/// let mut bridge = PopupBridge::new(config, ports, store)?;
/// bridge.on_tokens(Box::new(|tokens, context| { /* hand off */ }));
/// let pending = bridge.initiate()?;
/// // arm a timer for pending.timeout, feed events to handle_message()
/// ```
pub struct PopupBridge {
    pub(crate) session: ProtocolSession,
    pub(crate) config: BridgeConfig,
    pub(crate) messenger: SecureMessenger,
    pub(crate) ids: RequestIdGenerator,
    pub(crate) ports: BridgePorts,
    pub(crate) store: Arc<dyn TokenStore>,
    pub(crate) subscription: Option<Subscription>,
    pub(crate) observer: Option<TokenObserver>,
}

impl PopupBridge {
    /// Create a popup bridge and start listening.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration does not validate.
    pub fn new(
        config: BridgeConfig,
        ports: BridgePorts,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let messenger = SecureMessenger::new(
            ports.host.own_origin(),
            config.sender_origin.clone(),
            ports.host.this_window(),
        );
        let subscription = ports.host.subscribe();
        info!(
            sender_origin = %config.sender_origin,
            own_origin = %ports.host.own_origin(),
            "Popup bridge listening"
        );

        Ok(Self {
            session: ProtocolSession::new(config.sender_origin.clone()),
            ids: RequestIdGenerator::new(config.request_id_length),
            config,
            messenger,
            ports,
            store,
            subscription: Some(subscription),
            observer: None,
        })
    }

    /// The session (read-only).
    pub fn session(&self) -> &ProtocolSession {
        &self.session
    }

    /// The configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether the bridge still has a listener registered.
    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }

    /// Wait for the next inbound event. `None` once disconnected or the host
    /// window is gone.
    pub async fn next_event(&mut self) -> Option<MessageEvent> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => None,
        }
    }

    /// Handle every event already queued on the listener.
    pub fn pump(&mut self) -> Vec<InboundOutcome> {
        use crate::ports::PopupBridgeApi;

        let mut outcomes = Vec::new();
        while let Some(event) = self
            .subscription
            .as_mut()
            .and_then(|s| s.try_recv().ok().flatten())
        {
            outcomes.push(self.handle_message(event));
        }
        outcomes
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.ports.time.now()
    }

    pub(crate) fn report(&self, message: &str, kind: StatusKind) {
        self.ports.status.update(message, kind);
    }
}

/// Encode a typed `data` body.
pub(crate) fn body<T: Serialize>(value: &T) -> Result<serde_json::Value, BridgeError> {
    serde_json::to_value(value).map_err(|e| DispatchError::Serialization(e.to_string()).into())
}

impl std::fmt::Debug for PopupBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupBridge")
            .field("session", &self.session)
            .field("listening", &self.subscription.is_some())
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
