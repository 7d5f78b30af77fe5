//! primitives-core
//!
//! AES-256-CFB8, SHA-256 and DEFLATE/INFLATE behind swappable backends.
//! Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod backend;
pub mod handles;
pub mod config;

// Primitives
pub mod crypto;
pub mod compression;
pub mod telemetry;

// Handle-level facade and protocol compositions
pub mod api;
pub mod pipeline;

pub use api::Primitives;
pub use backend::Backend;
pub use handles::Handle;
pub use types::{PrimitiveError, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::api::Primitives;
    pub use crate::backend::Backend;
    pub use crate::compression::{compress_all, decompress_all, CompressionSession, Mode, ProcessOutcome};
    pub use crate::config::{ConfigError, PrimitivesConfig};
    pub use crate::crypto::{sha256, CipherSession, DigestSession, Direction};
    pub use crate::handles::Handle;
    pub use crate::pipeline::{
        derive_session_keys, generate_salt, BatchCompressor, BatchDecompressor, PacketDecryptor,
        PacketEncryptor, PacketError, SessionKeys,
    };
    pub use crate::telemetry::{PrimitiveCounters, TelemetrySnapshot};
    pub use crate::types::{PrimitiveError, Result};
}
