//! pipeline/mod.rs
//! Connection-level compositions of the primitives: key derivation, sealed packets
//! and compressed batches.

pub mod types;
pub mod keys;
pub mod encryption;
pub mod varint;
pub mod batch;

pub use types::PacketError;
pub use keys::{derive_session_keys, generate_salt, SessionKeys};
pub use encryption::{PacketDecryptor, PacketEncryptor};
pub use batch::{BatchCompressor, BatchDecompressor, BATCH_FLUSH_THRESHOLD};
