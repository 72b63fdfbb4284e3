//! # Request Identifiers
//!
//! Opaque correlation ids for outbound requests, drawn from the operating
//! system CSPRNG over the 62-character alphanumeric alphabet.
//!
//! Ids correlate requests with responses. They are not secrets and grant
//! nothing: trust comes from origin checks alone.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Default id length.
pub const DEFAULT_REQUEST_ID_LENGTH: usize = 32;

/// Generate a request id of `length` characters from `[A-Za-z0-9]`.
pub fn generate_request_id(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generator bound to a configured id length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIdGenerator {
    length: usize,
}

impl RequestIdGenerator {
    /// Create a generator producing ids of `length` characters.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Configured id length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Produce a fresh id.
    pub fn generate(&self) -> String {
        generate_request_id(self.length)
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_ID_LENGTH)
    }
}
