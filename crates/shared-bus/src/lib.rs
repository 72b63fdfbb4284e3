//! # Shared Bus - In-Process Window Bus
//!
//! Simulates browsing contexts and their cross-context message channel so the
//! token bridge can run and be tested outside a browser.
//!
//! ```text
//! ┌──────────────┐   post_message(data, target_origin)   ┌──────────────┐
//! │    Opener    │ <──────────────────────────────────── │    Popup     │
//! │ (app origin) │ ────────────────────────────────────> │(auth origin) │
//! └──────────────┘     event { origin, data, source }    └──────────────┘
//! ```
//!
//! ## Delivery Rules
//!
//! - A message whose target origin differs from the receiver's origin is dropped
//!   silently, as a browser does.
//! - The event origin is always the sender window's origin; it cannot be forged
//!   by the payload.
//! - Posting to a closed window fails with `DispatchError::WindowClosed`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod subscriber;
pub mod window;

pub use subscriber::{ListenerId, ListenerRegistry, Subscription, SubscriptionError};
pub use window::{InProcessWindow, ANY_ORIGIN};
