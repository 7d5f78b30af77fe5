//! types.rs
//! Unified error type for all three primitives.
//!
//! Notes:
//! - Every error is surfaced synchronously to the caller of the failing operation.
//! - No retries happen inside the core; re-init on a setup fault is a caller policy.
//! - A `CompressionFault` poisons the session it came from; see `Poisoned`.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PrimitiveError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Cipher init with a key that is not 32 bytes.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Cipher init with an IV that is not one block.
    #[error("invalid iv length: expected={expected}, actual={actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// Cipher output buffer is not the same length as its input.
    #[error("length mismatch: input={input}, output={output}")]
    LengthMismatch { input: usize, output: usize },

    /// Operation on a zero or already freed handle.
    #[error("use after free: handle 0x{handle:016x} is null or already freed")]
    UseAfterFree { handle: u64 },

    /// The underlying algorithm rejected its setup parameters.
    #[error("{algorithm} init failed with status {code}")]
    AlgorithmInitFault { algorithm: &'static str, code: i32 },

    /// Mid-stream status other than ok / stream-end.
    #[error("compression fault (status {code}): {message}")]
    CompressionFault { code: i32, message: String },

    /// Session faulted earlier and must be freed.
    #[error("session is poisoned by an earlier fault and must be freed")]
    Poisoned,

    /// Backend id that maps to no implementation.
    #[error("unknown backend: {raw}")]
    UnknownBackend { raw: String },
}

impl PrimitiveError {
    /// Status code attached to algorithm faults, if any.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            PrimitiveError::AlgorithmInitFault { code, .. } => Some(*code),
            PrimitiveError::CompressionFault { code, .. } => Some(*code),
            _ => None,
        }
    }
}
