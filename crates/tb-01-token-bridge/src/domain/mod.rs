//! # Domain Module
//!
//! Session state, configuration and message-handling outcomes.

pub mod config;
pub mod outcome;
pub mod session;
pub mod state;

pub use config::*;
pub use outcome::*;
pub use session::ProtocolSession;
pub use state::*;
