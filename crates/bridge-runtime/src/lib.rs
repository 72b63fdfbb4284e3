//! # Token Bridge Runtime
//!
//! Demo host for the token bridge.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file/env, see `TomlConfigLoader`)
//! 2. Install the tracing subscriber
//! 3. Open the opener context and a popup context on the in-process bus
//! 4. Start the opener responder and the popup driver on one task each
//! 5. Wait for the transfer, or for the handshake to give up
//! 6. Disconnect both sides and report
//!
//! ```text
//!   opener (sender_origin)                 popup (popup_origin)
//!          │                                       │
//!          │ ◄──────── HANDSHAKE_REQUEST ───────── │  after start delay
//!          │ ───────── HANDSHAKE_RESPONSE ───────► │  Connected
//!          │ ───────── TOKEN_TRANSFER ───────────► │  store + observer
//!          │ ◄──────── TOKEN_RECEIVED ──────────── │  TokensReceived
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use shared_bus::InProcessWindow;
use shared_types::{generate_request_id, TokenPair, TokenTransferData, TransferContext};
use tb_01_token_bridge::{
    run_opener, run_popup, BridgeConfig, BridgePorts, ConnectionState, DriverHandle,
    InMemoryTokenStore, InProcessHost, OpenerBridge, OpenerBridgeApi, PopupBridge,
    PopupBridgeApi, ResponderState, SystemTimeSource, TokenStore, TracingStatusSink,
};
use tracing::{info, warn};

/// Origin of the demo popup context.
pub const DEFAULT_POPUP_ORIGIN: &str = "https://auth.example.com";

/// Origin of the demo opener context when none is configured.
pub const DEFAULT_OPENER_ORIGIN: &str = "https://app.example.com";

/// Grace period after the handshake timeout before the demo gives up.
const SETTLE_GRACE: Duration = Duration::from_secs(2);

/// What the demo runs.
#[derive(Debug, Clone)]
pub struct DemoSettings {
    /// Popup-side configuration. Its `sender_origin` is the opener's origin.
    pub popup: BridgeConfig,
    /// Origin the opener actually runs on.
    pub opener_origin: String,
    /// Origin the popup runs on.
    pub popup_origin: String,
    /// User the demo tokens belong to.
    pub user_id: String,
}

impl DemoSettings {
    /// Demo with an opener on the configured sender origin.
    pub fn new(popup: BridgeConfig) -> Self {
        Self {
            opener_origin: popup.sender_origin.clone(),
            popup_origin: DEFAULT_POPUP_ORIGIN.to_string(),
            user_id: "demo-user".to_string(),
            popup,
        }
    }

    /// Host the opener somewhere other than the configured sender origin.
    #[must_use]
    pub fn with_opener_origin(mut self, origin: impl Into<String>) -> Self {
        self.opener_origin = origin.into();
        self
    }

    /// How long to wait for the popup driver before shutting it down.
    pub fn deadline(&self) -> Duration {
        self.popup.handshake_start_delay() + self.popup.handshake_timeout() + SETTLE_GRACE
    }
}

/// How far the exchange got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    /// Final popup state (`Disconnected` when the demo had to stop it).
    pub popup_state: ConnectionState,
    /// Final opener state.
    pub opener_state: ResponderState,
    /// Whether the popup's store holds tokens.
    pub tokens_stored: bool,
    /// Origin recorded as the token source.
    pub token_source: Option<String>,
}

impl DemoOutcome {
    /// Both sides saw the transfer through.
    pub fn is_complete(&self) -> bool {
        self.tokens_stored
            && self.popup_state == ConnectionState::TokensReceived
            && self.opener_state == ResponderState::TokensDelivered
    }
}

fn demo_transfer(user_id: &str) -> TokenTransferData {
    TokenTransferData {
        tokens: TokenPair::new(generate_request_id(48), generate_request_id(48)),
        context: TransferContext {
            user_id: Some(user_id.to_string()),
            issued_at: Some(Utc::now()),
        },
    }
}

/// Run one popup/opener exchange on the current runtime.
pub async fn run_demo(settings: DemoSettings) -> Result<DemoOutcome> {
    let opener_window = InProcessWindow::new(settings.opener_origin.clone());
    let popup_window = opener_window.open_popup(settings.popup_origin.clone());
    let store = Arc::new(InMemoryTokenStore::new());

    let opener_config = BridgeConfig::new(settings.popup_origin.clone())
        .with_debug(settings.popup.debug);
    let opener = OpenerBridge::new(
        opener_config,
        BridgePorts::new(
            Arc::new(InProcessHost::new(opener_window.clone())),
            Arc::new(TracingStatusSink),
            Arc::new(SystemTimeSource),
        ),
    )
    .context("Invalid opener configuration")?;

    let mut popup = PopupBridge::new(
        settings.popup.clone(),
        BridgePorts::new(
            Arc::new(InProcessHost::new(popup_window)),
            Arc::new(TracingStatusSink),
            Arc::new(SystemTimeSource),
        ),
        store.clone(),
    )
    .context("Invalid popup configuration")?;

    let user_id = settings.user_id.clone();
    popup.on_tokens(Box::new(move |_tokens, context| {
        info!(
            user_id = ?context.user_id,
            expected = %user_id,
            "Tokens handed to the application"
        );
    }));

    info!(
        opener = %settings.opener_origin,
        popup = %settings.popup_origin,
        "Starting token exchange"
    );

    let (handle, control) = DriverHandle::channel();
    let opener_task = tokio::spawn(run_opener(
        opener,
        demo_transfer(&settings.user_id),
        handle.shutdown_signal(),
    ));
    let mut popup_task = tokio::spawn(run_popup(popup, control));

    let popup = match tokio::time::timeout(settings.deadline(), &mut popup_task).await {
        Ok(joined) => joined.context("Popup driver panicked")?,
        Err(_) => {
            warn!(
                deadline_secs = settings.deadline().as_secs(),
                "Exchange did not finish; shutting down"
            );
            handle.shutdown();
            popup_task.await.context("Popup driver panicked")?
        }
    };

    // The opener stops on its own once the ack lands.
    if popup.state() != ConnectionState::TokensReceived {
        handle.shutdown();
    }
    let opener = opener_task.await.context("Opener driver panicked")?;

    let outcome = DemoOutcome {
        popup_state: popup.state(),
        opener_state: opener.state(),
        tokens_stored: store.has_tokens(),
        token_source: store.token_metadata().map(|m| m.source),
    };
    info!(
        popup_state = %outcome.popup_state,
        opener_state = %outcome.opener_state,
        tokens_stored = outcome.tokens_stored,
        "Token exchange finished"
    );
    Ok(outcome)
}
