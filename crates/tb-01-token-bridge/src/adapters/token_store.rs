//! In-memory token store.

use crate::ports::TokenStore;
use parking_lot::RwLock;
use shared_types::{TokenMetadata, TokenPair};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Holds at most one token pair in memory. Nothing is persisted.
#[derive(Debug)]
pub struct InMemoryTokenStore {
    held: RwLock<Option<(TokenPair, TokenMetadata)>>,
    accepting: AtomicBool,
    store_calls: AtomicUsize,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self {
            held: RwLock::new(None),
            accepting: AtomicBool::new(true),
            store_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryTokenStore {
    /// Empty store that accepts tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `store_tokens` refuse (false) or accept (true) subsequent tokens.
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// How many times `store_tokens` was called.
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    /// A copy of the held tokens.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.held.read().as_ref().map(|(tokens, _)| tokens.clone())
    }
}

impl TokenStore for InMemoryTokenStore {
    fn store_tokens(&self, tokens: &TokenPair, metadata: &TokenMetadata) -> bool {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if !self.accepting.load(Ordering::SeqCst) {
            return false;
        }
        // Replacing drops, and so zeroizes, any previous pair.
        *self.held.write() = Some((tokens.clone(), metadata.clone()));
        true
    }

    fn has_tokens(&self) -> bool {
        self.held.read().is_some()
    }

    fn token_metadata(&self) -> Option<TokenMetadata> {
        self.held.read().as_ref().map(|(_, metadata)| metadata.clone())
    }

    fn clear_tokens(&self) {
        self.held.write().take();
    }
}
