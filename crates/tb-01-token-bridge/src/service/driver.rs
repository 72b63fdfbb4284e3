//! # Event Loop Driver
//!
//! Runs a bridge on a single task. Inbound events are handled one at a time to
//! completion; the only suspension points are the start-up delay and the
//! handshake timers.

use super::core::PopupBridge;
use super::opener::OpenerBridge;
use crate::domain::{InboundOutcome, PendingHandshake, ResponderState};
use crate::ports::{OpenerBridgeApi, PopupBridgeApi};
use shared_types::TokenTransferData;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

/// Controls a running driver from the host.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    shutdown: watch::Sender<bool>,
    retry: mpsc::UnboundedSender<()>,
}

/// Driver side of a [`DriverHandle`].
#[derive(Debug)]
pub struct DriverControl {
    shutdown: watch::Receiver<bool>,
    retry: mpsc::UnboundedReceiver<()>,
}

impl DriverHandle {
    /// Create a handle and the control it drives.
    pub fn channel() -> (Self, DriverControl) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        (
            Self {
                shutdown: shutdown_tx,
                retry: retry_tx,
            },
            DriverControl {
                shutdown: shutdown_rx,
                retry: retry_rx,
            },
        )
    }

    /// Ask the driver to disconnect and stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Ask the popup driver to start a new handshake.
    pub fn retry(&self) {
        let _ = self.retry.send(());
    }

    /// Another shutdown receiver, e.g. for an opener driver.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

/// Resolves once shutdown is requested. Never resolves if the handle is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Armed handshake timers. Never cancelled; expiry is checked against state.
#[derive(Debug, Default)]
struct HandshakeTimers {
    armed: Vec<(Instant, String)>,
}

impl HandshakeTimers {
    fn arm(&mut self, pending: PendingHandshake) {
        self.armed
            .push((Instant::now() + pending.timeout, pending.request_id));
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.armed.iter().map(|(deadline, _)| *deadline).min()
    }

    fn expire(&mut self, now: Instant) -> Vec<String> {
        let (due, armed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.armed)
            .into_iter()
            .partition(|(deadline, _)| *deadline <= now);
        self.armed = armed;
        due.into_iter().map(|(_, request_id)| request_id).collect()
    }
}

fn initiate(bridge: &mut PopupBridge, timers: &mut HandshakeTimers) {
    match bridge.initiate() {
        Ok(pending) => timers.arm(pending),
        Err(e) => warn!(error = %e, "Handshake not started"),
    }
}

/// Placeholder deadline for a disabled timer branch.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400)
}

/// Run the popup bridge until tokens are received, the listener closes or
/// shutdown is requested. Returns the bridge for inspection.
pub async fn run_popup(mut bridge: PopupBridge, mut control: DriverControl) -> PopupBridge {
    let start_delay = bridge.config().handshake_start_delay();
    tokio::select! {
        _ = sleep(start_delay) => {}
        _ = shutdown_requested(&mut control.shutdown) => {
            bridge.disconnect();
            return bridge;
        }
    }

    let mut timers = HandshakeTimers::default();
    initiate(&mut bridge, &mut timers);

    loop {
        let deadline = timers.next_deadline();
        tokio::select! {
            event = bridge.next_event() => {
                let Some(event) = event else {
                    debug!("Listener closed");
                    break;
                };
                let outcome = bridge.handle_message(event);
                debug!(?outcome, state = %bridge.state(), "Inbound message processed");
                if bridge.has_received_tokens() {
                    info!("Token transfer complete");
                    break;
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(far_future)), if deadline.is_some() => {
                for request_id in timers.expire(Instant::now()) {
                    bridge.on_handshake_timeout(&request_id);
                }
            }
            Some(()) = control.retry.recv() => {
                initiate(&mut bridge, &mut timers);
            }
            _ = shutdown_requested(&mut control.shutdown) => {
                bridge.disconnect();
                break;
            }
        }
    }

    bridge
}

/// Run the opener bridge: answer handshakes and send `transfer` to every
/// handshaken popup until one acknowledges it.
pub async fn run_opener(
    mut bridge: OpenerBridge,
    transfer: TokenTransferData,
    mut shutdown: watch::Receiver<bool>,
) -> OpenerBridge {
    loop {
        tokio::select! {
            event = bridge.next_event() => {
                let Some(event) = event else {
                    debug!("Listener closed");
                    break;
                };
                let outcome = bridge.handle_message(event);
                debug!(?outcome, state = %bridge.state(), "Inbound message processed");

                if matches!(outcome, InboundOutcome::Handled(_))
                    && bridge.state() == ResponderState::Connected
                    && bridge.awaiting_ack().is_none()
                {
                    if let Err(e) = bridge.send_tokens(&transfer) {
                        warn!(error = %e, "Token transfer not sent");
                    }
                }
                if bridge.tokens_delivered() {
                    break;
                }
            }
            _ = shutdown_requested(&mut shutdown) => {
                bridge.disconnect();
                break;
            }
        }
    }

    bridge
}
