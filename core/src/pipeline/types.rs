//! pipeline/types.rs
//! Error type for the packet and batch layers.

use thiserror::Error;

use crate::types::PrimitiveError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// Packet checksum did not match its payload.
    #[error("checksum mismatch on packet {counter}")]
    ChecksumMismatch { counter: u64 },

    /// Packet too short to carry a checksum.
    #[error("truncated packet: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    /// Batch framing could not be parsed.
    #[error("malformed batch: {0}")]
    MalformedBatch(String),
}
