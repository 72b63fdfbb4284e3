//! Shared fixtures: one opener context, one popup context, both bridges, a
//! manual clock and hostile contexts on other origins.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use shared_bus::{InProcessWindow, Subscription};
use shared_types::{
    MessageEnvelope, PeerWindow, TokenPair, TokenTransferData, TransferContext,
};
use std::sync::Arc;
use tb_01_token_bridge::{
    BridgeConfig, BridgePorts, InMemoryTokenStore, InProcessHost, ManualTimeSource,
    OpenerBridge, OpenerBridgeApi, PopupBridge, PopupBridgeApi, RecordingStatusSink, TimeSource,
};

/// Origin of the legitimate opener.
pub const APP_ORIGIN: &str = "https://app.example.com";
/// Origin of the popup.
pub const POPUP_ORIGIN: &str = "https://auth.example.com";
/// Origin of the attacker.
pub const EVIL_ORIGIN: &str = "https://evil.example.com";

/// Fixed start of the manual clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26)
        .single()
        .unwrap_or_default()
}

/// Build a raw wire envelope.
pub fn envelope(
    kind: &str,
    request_id: &str,
    data: Value,
    timestamp: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
) -> Value {
    let mut metadata = serde_json::Map::new();
    // Attackers always claim to be the app; only the platform origin counts.
    metadata.insert("sender".into(), json!(APP_ORIGIN));
    if let Some(timestamp) = timestamp {
        metadata.insert("timestamp".into(), json!(timestamp.to_rfc3339()));
    }
    if let Some(expires_at) = expires_at {
        metadata.insert("expiresAt".into(), json!(expires_at.to_rfc3339()));
    }
    json!({ "type": kind, "requestId": request_id, "data": data, "metadata": metadata })
}

/// `TOKEN_TRANSFER` payload.
pub fn token_data(access: &str, refresh: &str, user_id: &str) -> Value {
    json!({
        "tokens": { "accessToken": access, "refreshToken": refresh },
        "userId": user_id
    })
}

/// What the opener hands over.
pub fn transfer(access: &str, refresh: &str, user_id: &str) -> TokenTransferData {
    TokenTransferData {
        tokens: TokenPair::new(access, refresh),
        context: TransferContext {
            user_id: Some(user_id.to_string()),
            issued_at: None,
        },
    }
}

/// A popup opened by an opener, each side running its bridge.
pub struct Scenario {
    /// Shared manual clock.
    pub clock: Arc<ManualTimeSource>,
    /// Opener context.
    pub opener_window: Arc<InProcessWindow>,
    /// Popup context.
    pub popup_window: Arc<InProcessWindow>,
    /// Popup-side bridge.
    pub popup: PopupBridge,
    /// Opener-side bridge.
    pub opener: OpenerBridge,
    /// The popup's token store.
    pub store: Arc<InMemoryTokenStore>,
    /// Status updates reported by the popup.
    pub popup_status: Arc<RecordingStatusSink>,
    /// Status updates reported by the opener.
    pub opener_status: Arc<RecordingStatusSink>,
}

impl Scenario {
    /// Legitimate opener on `APP_ORIGIN`.
    pub fn new() -> Self {
        Self::with_opener_origin(APP_ORIGIN)
    }

    /// Opener hosted on `origin`; the popup still trusts only `APP_ORIGIN`.
    pub fn with_opener_origin(origin: &str) -> Self {
        let clock = Arc::new(ManualTimeSource::new(epoch()));
        let opener_window = InProcessWindow::new(origin);
        let popup_window = opener_window.open_popup(POPUP_ORIGIN);
        let store = Arc::new(InMemoryTokenStore::new());
        let popup_status = Arc::new(RecordingStatusSink::new());
        let opener_status = Arc::new(RecordingStatusSink::new());

        let popup = PopupBridge::new(
            BridgeConfig::new(APP_ORIGIN).with_debug(true),
            BridgePorts::new(
                Arc::new(InProcessHost::new(popup_window.clone())),
                popup_status.clone(),
                clock.clone(),
            ),
            store.clone(),
        )
        .expect("popup config is valid");

        let opener = OpenerBridge::new(
            BridgeConfig::new(POPUP_ORIGIN),
            BridgePorts::new(
                Arc::new(InProcessHost::new(opener_window.clone())),
                opener_status.clone(),
                clock.clone(),
            ),
        )
        .expect("opener config is valid");

        Self {
            clock,
            opener_window,
            popup_window,
            popup,
            opener,
            store,
            popup_status,
            opener_status,
        }
    }

    /// Current manual time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run the handshake: request, response, both sides connected.
    pub fn handshake(&mut self) -> String {
        let pending = self.popup.initiate().expect("opener is reachable");
        self.opener.pump();
        self.popup.pump();
        pending.request_id
    }

    /// Handshake plus transfer plus acknowledgment.
    pub fn complete_exchange(&mut self, tokens: &TokenTransferData) -> String {
        self.handshake();
        let request_id = self.opener.send_tokens(tokens).expect("opener is connected");
        self.popup.pump();
        self.opener.pump();
        request_id
    }

    /// A hostile context on `EVIL_ORIGIN`.
    pub fn attacker(&self) -> Attacker {
        Attacker::new(EVIL_ORIGIN)
    }

    /// A listener on the popup's context that sees everything it receives.
    pub fn eavesdrop_popup(&self) -> Subscription {
        self.popup_window.subscribe()
    }

    /// Timestamp and expiry a well-behaved sender would stamp right now.
    pub fn fresh_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let now = self.now();
        (Some(now), Some(now + Duration::seconds(60)))
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

/// A browsing context under an attacker's control.
pub struct Attacker {
    /// The attacker's window.
    pub window: Arc<InProcessWindow>,
    inbox: Subscription,
}

impl Attacker {
    /// Attacker context on `origin`.
    pub fn new(origin: &str) -> Self {
        let window = InProcessWindow::new(origin);
        let inbox = window.subscribe();
        Self { window, inbox }
    }

    /// Post `data` to `target`, addressed to whatever origin the target has.
    pub fn post(&self, target: &Arc<InProcessWindow>, data: Value) {
        target
            .post_message(data, target.origin(), &self.window.as_source())
            .expect("target window is open");
    }

    /// Everything delivered back to the attacker.
    pub fn received(&mut self) -> Vec<MessageEnvelope> {
        let mut received = Vec::new();
        while let Ok(Some(event)) = self.inbox.try_recv() {
            if let Ok(envelope) = MessageEnvelope::decode(event.data) {
                received.push(envelope);
            }
        }
        received
    }
}
