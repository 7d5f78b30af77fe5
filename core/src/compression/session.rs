//! compression/session.rs
//! Compression session: mode, level and framing fixed at init, fault poisoning on top of a codec.

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::compression::constants::status;
use crate::compression::registry::create_codec;
use crate::compression::types::{Codec, Mode, ProcessOutcome};
use crate::constants::MAX_COMPRESSION_LEVEL;
use crate::types::{PrimitiveError, Result};

pub struct CompressionSession {
    codec: Box<dyn Codec>,
    backend: Backend,
    mode: Mode,
    level: u32,
    raw: bool,
    finished: bool,
    consumed_last: usize,
    poisoned: bool,
}

impl CompressionSession {
    /// `level` is only checked and used when compressing.
    pub fn new(backend: Backend, mode: Mode, level: u32, raw: bool) -> Result<Self> {
        if mode == Mode::Compress && level > MAX_COMPRESSION_LEVEL {
            return Err(PrimitiveError::AlgorithmInitFault {
                algorithm: "deflate",
                code: status::Z_STREAM_ERROR,
            });
        }
        debug!(%backend, %mode, level, raw, "compression session created");
        Ok(Self {
            codec: create_codec(backend, mode, level, raw),
            backend,
            mode,
            level,
            raw,
            finished: false,
            consumed_last: 0,
            poisoned: false,
        })
    }

    pub fn backend(&self) -> Backend { self.backend }
    pub fn mode(&self) -> Mode { self.mode }
    pub fn level(&self) -> u32 { self.level }
    pub fn raw(&self) -> bool { self.raw }
    pub fn finished(&self) -> bool { self.finished }
    pub fn consumed_last(&self) -> usize { self.consumed_last }
    pub fn is_poisoned(&self) -> bool { self.poisoned }

    /// One streaming step. See [`Codec`] for the compress / decompress contract.
    ///
    /// A fault poisons the session; every later call fails with `Poisoned`.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome> {
        if self.poisoned {
            return Err(PrimitiveError::Poisoned);
        }
        match self.codec.process(input, output) {
            Ok(outcome) => {
                self.finished = outcome.finished;
                self.consumed_last = outcome.consumed;
                Ok(outcome)
            }
            Err(e) => {
                self.poisoned = true;
                self.consumed_last = 0;
                warn!(backend = %self.backend, mode = %self.mode, error = %e, "compression session poisoned");
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.poisoned {
            return Err(PrimitiveError::Poisoned);
        }
        self.codec.reset();
        self.finished = false;
        self.consumed_last = 0;
        debug!(backend = %self.backend, mode = %self.mode, "compression session reset");
        Ok(())
    }
}

impl std::fmt::Debug for CompressionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressionSession")
            .field("backend", &self.backend)
            .field("mode", &self.mode)
            .field("level", &self.level)
            .field("raw", &self.raw)
            .field("finished", &self.finished)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
