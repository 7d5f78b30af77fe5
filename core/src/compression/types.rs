//! compression/types.rs
//! Mode ids, per-call outcome and the codec capability trait.

use std::fmt;
use num_enum::TryFromPrimitive;

use crate::compression::constants::status;
use crate::types::{PrimitiveError, Result};

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Mode {
    Compress   = 0x01,
    Decompress = 0x02,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress   => f.write_str("compress"),
            Mode::Decompress => f.write_str("decompress"),
        }
    }
}

/// Result of one `process` call. Counts are per call, never cumulative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Bytes written to the caller's output buffer.
    pub produced: usize,
    /// Bytes taken from the caller's input buffer.
    pub consumed: usize,
    /// Logical end of stream has been reached.
    pub finished: bool,
}

impl ProcessOutcome {
    pub fn new(produced: usize, consumed: usize, finished: bool) -> Self {
        Self { produced, consumed, finished }
    }

    pub fn ended() -> Self {
        Self { produced: 0, consumed: 0, finished: true }
    }
}

/// Streaming (de)compressor behind a session.
///
/// Compressors treat an empty `input` as the end-of-stream request and keep returning
/// drained output on repeated empty calls until `finished`. Decompressors emit every
/// decodable byte on each call and never consume bytes past the end of the stream. A
/// decompress call that can make no progress at all fails with `Z_BUF_ERROR`.
pub trait Codec: Send {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome>;

    /// Drop window/table state, keeping mode, level and framing.
    fn reset(&mut self);
}

pub(crate) fn data_error(message: impl Into<String>) -> PrimitiveError {
    PrimitiveError::CompressionFault { code: status::Z_DATA_ERROR, message: message.into() }
}

pub(crate) fn buf_error(op: &str) -> PrimitiveError {
    PrimitiveError::CompressionFault {
        code: status::Z_BUF_ERROR,
        message: format!("{op} could not make progress"),
    }
}

pub(crate) fn stream_error(message: impl Into<String>) -> PrimitiveError {
    PrimitiveError::CompressionFault { code: status::Z_STREAM_ERROR, message: message.into() }
}
