//! # Token Bridge Service
//!
//! `PopupBridge` implements the `PopupBridgeApi` port: handshake state machine,
//! token relay and secure messenger wired to the outbound ports.
//! `OpenerBridge` is the counterpart responder in the opener window.
//!
//! Inbound messages pass through the validator first, then go by type to the
//! handshake or the relay.

// Semantic submodules
mod api;
mod core;
mod driver;
mod handshake;
pub mod messenger;
mod opener;
mod relay;

// Re-export public API
pub use core::PopupBridge;
pub use driver::{run_opener, run_popup, DriverControl, DriverHandle};
pub use messenger::{SecureMessenger, Targets};
pub use opener::OpenerBridge;
