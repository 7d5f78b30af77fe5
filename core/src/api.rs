//! api.rs
//! Handle-level facade over the three session kinds.
//!
//! Notes:
//! - Each primitive's backend is fixed when the facade is built.
//! - `*_free` is idempotent: null and already freed handles are ignored.
//! - Every other call on a null or stale handle fails with `UseAfterFree`.

use tracing::debug;

use crate::backend::Backend;
use crate::compression::{CompressionSession, Mode, ProcessOutcome};
use crate::config::{ConfigError, PrimitivesConfig};
use crate::constants::DIGEST_LEN_32;
use crate::crypto::{CipherSession, DigestSession, Direction};
use crate::handles::{Handle, HandleTable};
use crate::telemetry::{Primitive, PrimitiveCounters, TelemetrySnapshot};
use crate::types::{PrimitiveError, Result};

pub struct Primitives {
    cipher_backend: Backend,
    digest_backend: Backend,
    compression_backend: Backend,
    ciphers: HandleTable<CipherSession>,
    hashers: HandleTable<DigestSession>,
    compressors: HandleTable<CompressionSession>,
    counters: PrimitiveCounters,
}

impl Default for Primitives {
    fn default() -> Self {
        Self::new(Backend::default(), Backend::default(), Backend::default())
    }
}

impl Primitives {
    pub fn new(cipher_backend: Backend, digest_backend: Backend, compression_backend: Backend) -> Self {
        Self {
            cipher_backend,
            digest_backend,
            compression_backend,
            ciphers: HandleTable::new(),
            hashers: HandleTable::new(),
            compressors: HandleTable::new(),
            counters: PrimitiveCounters::default(),
        }
    }

    /// Same backend for every primitive.
    pub fn with_backend(backend: Backend) -> Self {
        Self::new(backend, backend, backend)
    }

    pub fn from_config(config: &PrimitivesConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.cipher_backend, config.digest_backend, config.compression_backend))
    }

    pub fn cipher_backend(&self) -> Backend { self.cipher_backend }
    pub fn digest_backend(&self) -> Backend { self.digest_backend }
    pub fn compression_backend(&self) -> Backend { self.compression_backend }

    pub fn counters(&self) -> &PrimitiveCounters {
        &self.counters
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters)
    }

    // --- cipher ---

    pub fn cipher_init(&mut self, direction: Direction, key: &[u8], iv: &[u8]) -> Result<Handle> {
        let session = CipherSession::new(self.cipher_backend, direction, key, iv)?;
        let handle = self.ciphers.insert(session);
        self.counters.opened(Primitive::Cipher);
        Ok(handle)
    }

    /// `output` must be exactly as long as `input`.
    pub fn cipher_process(&mut self, handle: Handle, input: &[u8], output: &mut [u8]) -> Result<()> {
        let session = self.ciphers.get_mut(handle)?;
        if input.len() != output.len() {
            return Err(PrimitiveError::LengthMismatch { input: input.len(), output: output.len() });
        }
        session.process(input, output);
        self.counters.add_ciphered(input.len());
        Ok(())
    }

    pub fn cipher_process_in_place(&mut self, handle: Handle, buf: &mut [u8]) -> Result<()> {
        self.ciphers.get_mut(handle)?.process_in_place(buf);
        self.counters.add_ciphered(buf.len());
        Ok(())
    }

    pub fn cipher_free(&mut self, handle: Handle) {
        self.release(Primitive::Cipher, handle);
    }

    // --- hasher ---

    pub fn hasher_init(&mut self) -> Handle {
        let handle = self.hashers.insert(DigestSession::new(self.digest_backend));
        self.counters.opened(Primitive::Digest);
        handle
    }

    pub fn hasher_update(&mut self, handle: Handle, data: &[u8]) -> Result<()> {
        self.hashers.get_mut(handle)?.update(data);
        self.counters.add_hashed(data.len());
        Ok(())
    }

    /// Digest of everything absorbed since the last digest; the session restarts.
    pub fn hasher_digest(&mut self, handle: Handle) -> Result<[u8; DIGEST_LEN_32]> {
        let digest = self.hashers.get_mut(handle)?.digest();
        self.counters.add_digest();
        Ok(digest)
    }

    pub fn hasher_free(&mut self, handle: Handle) {
        self.release(Primitive::Digest, handle);
    }

    // --- compressor ---

    pub fn compressor_init(&mut self, mode: Mode, level: u32, raw: bool) -> Result<Handle> {
        let session = CompressionSession::new(self.compression_backend, mode, level, raw)?;
        let handle = self.compressors.insert(session);
        self.counters.opened(Primitive::Compressor);
        Ok(handle)
    }

    pub fn compressor_process(
        &mut self,
        handle: Handle,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<ProcessOutcome> {
        let session = self.compressors.get_mut(handle)?;
        let mode = session.mode();
        match session.process(input, output) {
            Ok(outcome) => {
                self.counters.add_compression(mode, outcome.consumed, outcome.produced);
                Ok(outcome)
            }
            Err(e) => {
                if matches!(e, PrimitiveError::CompressionFault { .. }) {
                    self.counters.add_fault();
                }
                Err(e)
            }
        }
    }

    pub fn compressor_reset(&mut self, handle: Handle) -> Result<()> {
        self.compressors.get_mut(handle)?.reset()
    }

    pub fn compressor_free(&mut self, handle: Handle) {
        self.release(Primitive::Compressor, handle);
    }

    /// Direct access to a compression session, e.g. for `compress_all`.
    pub fn compressor(&mut self, handle: Handle) -> Result<&mut CompressionSession> {
        self.compressors.get_mut(handle)
    }

    /// Live sessions across all three tables.
    pub fn live_handles(&self) -> usize {
        self.ciphers.len() + self.hashers.len() + self.compressors.len()
    }

    fn release(&mut self, kind: Primitive, handle: Handle) {
        let released = match kind {
            Primitive::Cipher     => self.ciphers.remove(handle).is_some(),
            Primitive::Digest     => self.hashers.remove(handle).is_some(),
            Primitive::Compressor => self.compressors.remove(handle).is_some(),
        };
        if released {
            self.counters.freed(kind);
            debug!(%kind, ?handle, "session freed");
        } else {
            debug!(%kind, ?handle, "free ignored: null or stale handle");
        }
    }
}
