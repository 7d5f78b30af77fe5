//! crypto/types.rs
//! Capability seams for the cipher and digest backends.

use std::fmt;
use num_enum::TryFromPrimitive;

use crate::constants::{BLOCK_LEN_16, DIGEST_LEN_32};

/// Cipher direction, fixed for the lifetime of a session.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Direction {
    Encrypt = 0x01,
    Decrypt = 0x02,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Forward block cipher with a key schedule fixed at construction.
///
/// Only the encryption direction is exposed: CFB feeds ciphertext back through the
/// forward cipher in both directions, so no backend ever needs the inverse cipher.
pub trait BlockEncryptor: Send {
    fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN_16]);
}

/// Incremental SHA-256 engine.
pub trait HashEngine: Send {
    fn update(&mut self, data: &[u8]);

    /// Pad, emit the digest and return to the initial state.
    fn finalize_reset(&mut self) -> [u8; DIGEST_LEN_32];
}
