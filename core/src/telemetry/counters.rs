//! telemetry/counters.rs
//! Mutable counters updated on every facade call.
//!
//! Summary: Tracks session lifecycles and byte volumes per primitive.
//! Converted into an immutable TelemetrySnapshot on demand.
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::compression::Mode;

/// Which primitive a lifecycle event belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Cipher,
    Digest,
    Compressor,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Cipher     => f.write_str("cipher"),
            Primitive::Digest     => f.write_str("digest"),
            Primitive::Compressor => f.write_str("compressor"),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveCounters {
    pub cipher_sessions_opened: u64,
    pub cipher_sessions_freed: u64,
    pub bytes_ciphered: u64,

    pub digest_sessions_opened: u64,
    pub digest_sessions_freed: u64,
    pub bytes_hashed: u64,
    pub digests_emitted: u64,

    pub compressor_sessions_opened: u64,
    pub compressor_sessions_freed: u64,
    pub bytes_compress_in: u64,
    pub bytes_compress_out: u64,
    pub bytes_decompress_in: u64,
    pub bytes_decompress_out: u64,

    pub faults: u64,
}

impl PrimitiveCounters {
    pub fn opened(&mut self, kind: Primitive) {
        match kind {
            Primitive::Cipher     => self.cipher_sessions_opened += 1,
            Primitive::Digest     => self.digest_sessions_opened += 1,
            Primitive::Compressor => self.compressor_sessions_opened += 1,
        }
    }

    pub fn freed(&mut self, kind: Primitive) {
        match kind {
            Primitive::Cipher     => self.cipher_sessions_freed += 1,
            Primitive::Digest     => self.digest_sessions_freed += 1,
            Primitive::Compressor => self.compressor_sessions_freed += 1,
        }
    }

    pub fn add_ciphered(&mut self, len: usize) {
        self.bytes_ciphered += len as u64;
    }

    pub fn add_hashed(&mut self, len: usize) {
        self.bytes_hashed += len as u64;
    }

    pub fn add_digest(&mut self) {
        self.digests_emitted += 1;
    }

    /// Record one process call: `consumed` input bytes in, `produced` bytes out.
    pub fn add_compression(&mut self, mode: Mode, consumed: usize, produced: usize) {
        match mode {
            Mode::Compress => {
                self.bytes_compress_in += consumed as u64;
                self.bytes_compress_out += produced as u64;
            }
            Mode::Decompress => {
                self.bytes_decompress_in += consumed as u64;
                self.bytes_decompress_out += produced as u64;
            }
        }
    }

    pub fn add_fault(&mut self) {
        self.faults += 1;
    }

    /// Sessions opened but not yet freed.
    pub fn live(&self, kind: Primitive) -> u64 {
        match kind {
            Primitive::Cipher => self.cipher_sessions_opened.saturating_sub(self.cipher_sessions_freed),
            Primitive::Digest => self.digest_sessions_opened.saturating_sub(self.digest_sessions_freed),
            Primitive::Compressor => {
                self.compressor_sessions_opened.saturating_sub(self.compressor_sessions_freed)
            }
        }
    }

    pub fn merge(&mut self, other: &PrimitiveCounters) {
        *self += other.clone();
    }
}

impl AddAssign for PrimitiveCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.cipher_sessions_opened     += rhs.cipher_sessions_opened;
        self.cipher_sessions_freed      += rhs.cipher_sessions_freed;
        self.bytes_ciphered             += rhs.bytes_ciphered;

        self.digest_sessions_opened     += rhs.digest_sessions_opened;
        self.digest_sessions_freed      += rhs.digest_sessions_freed;
        self.bytes_hashed               += rhs.bytes_hashed;
        self.digests_emitted            += rhs.digests_emitted;

        self.compressor_sessions_opened += rhs.compressor_sessions_opened;
        self.compressor_sessions_freed  += rhs.compressor_sessions_freed;
        self.bytes_compress_in          += rhs.bytes_compress_in;
        self.bytes_compress_out         += rhs.bytes_compress_out;
        self.bytes_decompress_in        += rhs.bytes_decompress_in;
        self.bytes_decompress_out       += rhs.bytes_decompress_out;

        self.faults                     += rhs.faults;
    }
}
