//! crypto/digest.rs
//! Incremental SHA-256 session with auto-reset on digest.
//!
//! `digest()` finalizes and immediately re-initializes the state, so the same session
//! can start the next message without being rebuilt.

use tracing::debug;

use crate::backend::Backend;
use crate::constants::DIGEST_LEN_32;
use crate::crypto::registry::create_hash_engine;
use crate::crypto::types::HashEngine;

pub struct DigestSession {
    engine: Box<dyn HashEngine>,
    backend: Backend,
    pending_bytes: u64,
}

impl DigestSession {
    pub fn new(backend: Backend) -> Self {
        debug!(%backend, "sha256 session created");
        Self { engine: create_hash_engine(backend), backend, pending_bytes: 0 }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Absorb `data` into the running digest. Empty input is a no-op.
    pub fn update(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.pending_bytes += data.len() as u64;
        self.engine.update(data);
    }

    /// Bytes absorbed since the last digest.
    pub fn pending_bytes(&self) -> u64 {
        self.pending_bytes
    }

    /// Finish the current message and reset for the next one.
    pub fn digest(&mut self) -> [u8; DIGEST_LEN_32] {
        self.pending_bytes = 0;
        self.engine.finalize_reset()
    }
}
