//! # Token Bridge Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Two-context scenario and attacker helpers
//! ├── integration/      # Popup/opener exchanges over the in-process bus
//! │   └── flows.rs
//! └── exploits/         # Attack simulations against the popup
//!     ├── origin_spoofing.rs
//!     ├── replay.rs
//!     ├── forged_handshake.rs
//!     └── premature_transfer.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tb-tests
//!
//! # By category
//! cargo test -p tb-tests integration::
//! cargo test -p tb-tests exploits::
//! ```

pub mod harness;
pub mod integration;
