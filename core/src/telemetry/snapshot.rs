//! telemetry/snapshot.rs
//! Immutable, serializable view of the counters plus derived ratios.

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::{Primitive, PrimitiveCounters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: PrimitiveCounters,
    pub live_cipher_sessions: u64,
    pub live_digest_sessions: u64,
    pub live_compressor_sessions: u64,
    /// `bytes_compress_out / bytes_compress_in`, 0.0 before any input.
    pub compression_ratio: f64,
    /// `bytes_decompress_out / bytes_decompress_in`, 0.0 before any input.
    pub expansion_ratio: f64,
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl From<&PrimitiveCounters> for TelemetrySnapshot {
    fn from(counters: &PrimitiveCounters) -> Self {
        Self {
            counters: counters.clone(),
            live_cipher_sessions: counters.live(Primitive::Cipher),
            live_digest_sessions: counters.live(Primitive::Digest),
            live_compressor_sessions: counters.live(Primitive::Compressor),
            compression_ratio: ratio(counters.bytes_compress_out, counters.bytes_compress_in),
            expansion_ratio: ratio(counters.bytes_decompress_out, counters.bytes_decompress_in),
        }
    }
}

impl TelemetrySnapshot {
    pub fn live_sessions(&self) -> u64 {
        self.live_cipher_sessions + self.live_digest_sessions + self.live_compressor_sessions
    }

    /// Internal consistency: nothing freed that was never opened, ratios non-negative.
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.cipher_sessions_freed <= c.cipher_sessions_opened
            && c.digest_sessions_freed <= c.digest_sessions_opened
            && c.compressor_sessions_freed <= c.compressor_sessions_opened
            && self.compression_ratio >= 0.0
            && self.expansion_ratio >= 0.0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
