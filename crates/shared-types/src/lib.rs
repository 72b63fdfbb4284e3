//! # Shared Types Crate
//!
//! Types shared by both ends of the popup token bridge: the wire envelope,
//! per-tag payloads, the window port, the error taxonomy and the centralized
//! message validator.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-context type is defined here.
//! - **Origin Authority**: the platform-supplied event origin is the only trust
//!   anchor. The envelope's `metadata.sender` is informational.
//! - **One Validator**: both sides validate inbound traffic with
//!   [`security::validate_event`].

pub mod envelope;
pub mod errors;
pub mod identifier;
pub mod payloads;
pub mod security;
pub mod window;

pub use envelope::{EnvelopeMetadata, MessageEnvelope, MessageType};
pub use errors::*;
pub use identifier::{generate_request_id, RequestIdGenerator, DEFAULT_REQUEST_ID_LENGTH};
pub use payloads::*;
pub use security::*;
pub use window::*;
