//! Host environment backed by an in-process window.

use crate::ports::HostEnvironment;
use shared_bus::{InProcessWindow, Subscription};
use shared_types::WindowRef;
use std::sync::Arc;

/// Runs a bridge inside an [`InProcessWindow`].
#[derive(Debug, Clone)]
pub struct InProcessHost {
    window: Arc<InProcessWindow>,
}

impl InProcessHost {
    /// Host the bridge in `window`.
    pub fn new(window: Arc<InProcessWindow>) -> Self {
        Self { window }
    }

    /// The hosting window.
    pub fn window(&self) -> &Arc<InProcessWindow> {
        &self.window
    }
}

impl HostEnvironment for InProcessHost {
    fn own_origin(&self) -> String {
        self.window.origin().to_string()
    }

    fn opener(&self) -> Option<WindowRef> {
        self.window.opener().map(|opener| opener as WindowRef)
    }

    fn this_window(&self) -> Option<WindowRef> {
        Some(self.window.as_window_ref())
    }

    fn subscribe(&self) -> Subscription {
        self.window.subscribe()
    }
}
