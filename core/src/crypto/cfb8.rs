//! crypto/cfb8.rs
//! AES-256-CFB8 stream cipher session.
//!
//! Design notes:
//! - Segment size is one byte: every byte costs one full block encryption.
//! - The keystream block is always produced by the forward cipher, in both directions.
//! - The feedback register always holds exactly one block and shifts after every byte.

use tracing::debug;
use zeroize::Zeroize;

use crate::backend::Backend;
use crate::constants::{BLOCK_LEN_16, IV_LEN_16, KEY_LEN_32};
use crate::crypto::registry::create_block_encryptor;
use crate::crypto::types::{BlockEncryptor, Direction};
use crate::types::{PrimitiveError, Result};

pub struct CipherSession {
    engine: Box<dyn BlockEncryptor>,
    direction: Direction,
    feedback: [u8; BLOCK_LEN_16],
    backend: Backend,
}

impl std::fmt::Debug for CipherSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherSession")
            .field("backend", &self.backend)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl CipherSession {
    /// Build a session from a 32-byte key and a 16-byte IV.
    pub fn new(backend: Backend, direction: Direction, key: &[u8], iv: &[u8]) -> Result<Self> {
        let key: &[u8; KEY_LEN_32] = key.try_into().map_err(|_| PrimitiveError::InvalidKeyLength {
            expected: KEY_LEN_32,
            actual: key.len(),
        })?;
        let iv: [u8; IV_LEN_16] = iv.try_into().map_err(|_| PrimitiveError::InvalidIvLength {
            expected: IV_LEN_16,
            actual: iv.len(),
        })?;

        let engine = create_block_encryptor(backend, key);
        debug!(%backend, %direction, "cfb8 session created");

        Ok(Self { engine, direction, feedback: iv, backend })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Transform `input` into `output`.
    ///
    /// # Panics
    /// If the slices differ in length.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) {
        assert_eq!(input.len(), output.len(), "cfb8: output length must equal input length");
        for (src, dst) in input.iter().zip(output.iter_mut()) {
            *dst = self.step(*src);
        }
    }

    /// Transform `buf` in place.
    pub fn process_in_place(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.step(*b);
        }
    }

    /// Convenience wrapper returning a fresh buffer.
    pub fn process_to_vec(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = input.to_vec();
        self.process_in_place(&mut out);
        out
    }

    #[inline]
    fn step(&mut self, byte: u8) -> u8 {
        let mut keystream = self.feedback;
        self.engine.encrypt_block(&mut keystream);
        let out = byte ^ keystream[0];

        let cipher_byte = match self.direction {
            Direction::Encrypt => out,
            Direction::Decrypt => byte,
        };
        self.feedback.copy_within(1.., 0);
        self.feedback[BLOCK_LEN_16 - 1] = cipher_byte;
        keystream.zeroize();
        out
    }
}

impl Drop for CipherSession {
    fn drop(&mut self) {
        self.feedback.zeroize();
    }
}
