//! compression/codecs/mod.rs
//! Codec implementations: flate2-backed native and self-contained portable.

pub mod deflate;
pub mod portable;

pub use deflate::{NativeDeflate, NativeInflate};
pub use portable::{PortableDeflate, PortableInflate};
