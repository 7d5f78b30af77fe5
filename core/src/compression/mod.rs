//! compression/mod.rs
//! Streaming DEFLATE/INFLATE sessions, zlib-framed or raw.
//!
//! Notes:
//! - Counts in `ProcessOutcome` are per call; callers advance their own input slice.
//! - Compress: an empty input requests end of stream; keep calling with empty input
//!   until `finished` to drain.
//! - Decompress: partial flush on every call; bytes past the end of stream are left
//!   unconsumed.
//! - Any fault poisons the session until it is dropped.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;
pub mod session;
pub mod stream;

pub use constants::status;
pub use types::*;
pub use registry::*;
pub use session::CompressionSession;
pub use stream::{compress_all, decompress_all};
