//! compression/registry.rs
//! Codec factory.

use crate::backend::Backend;
use crate::compression::codecs::{NativeDeflate, NativeInflate, PortableDeflate, PortableInflate};
use crate::compression::types::{Codec, Mode};

/// `level` must already be validated (0..=9).
pub fn create_codec(backend: Backend, mode: Mode, level: u32, raw: bool) -> Box<dyn Codec> {
    match (backend, mode) {
        (Backend::Portable, Mode::Compress)   => Box::new(PortableDeflate::new(level, raw)),
        (Backend::Portable, Mode::Decompress) => Box::new(PortableInflate::new(raw)),
        (Backend::Native, Mode::Compress)     => Box::new(NativeDeflate::new(level, raw)),
        (Backend::Native, Mode::Decompress)   => Box::new(NativeInflate::new(raw)),
    }
}
