//! compression/codecs/portable/mod.rs
//! Self-contained DEFLATE (RFC 1951) with optional zlib framing (RFC 1950).
//!
//! Output is interoperable with any conforming inflater; the inflater accepts any conforming
//! stream, including ones produced by the native backend.

pub mod adler;
pub mod bits;
pub mod huffman;
pub mod deflater;
pub mod inflater;

pub use deflater::PortableDeflate;
pub use inflater::PortableInflate;

use crate::compression::constants::ZLIB_CMF;

/// Base match length for length codes 257..=285.
pub(crate) const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31,
    35, 43, 51, 59, 67, 83, 99, 115, 131, 163, 195, 227, 258,
];

pub(crate) const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2,
    3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub(crate) const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193,
    257, 385, 513, 769, 1025, 1537, 2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub(crate) const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6,
    7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13,
];

/// Transmission order of code-length code lengths.
pub(crate) const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

pub(crate) const END_OF_BLOCK: u16 = 256;
pub(crate) const LITLEN_CODES: usize = 286;
pub(crate) const DIST_CODES: usize = 30;
pub(crate) const CODE_LENGTH_CODES: usize = 19;
pub(crate) const MAX_CODE_BITS: u8 = 15;
pub(crate) const MAX_CODE_LENGTH_BITS: u8 = 7;

/// Lengths of the fixed literal/length code (RFC 1951 3.2.6), 288 entries.
pub(crate) fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [0u8; 288];
    for (sym, len) in lengths.iter_mut().enumerate() {
        *len = match sym {
            0..=143   => 8,
            144..=255 => 9,
            256..=279 => 7,
            _         => 8,
        };
    }
    lengths
}

pub(crate) fn fixed_dist_lengths() -> [u8; 30] {
    [5u8; 30]
}

/// Two-byte zlib header for the given level, FCHECK filled in.
pub(crate) fn zlib_header(level: u32) -> [u8; 2] {
    let flevel: u8 = match level {
        0 | 1 => 0,
        2..=5 => 1,
        6     => 2,
        _     => 3,
    };
    let mut flg = flevel << 6;
    let rem = ((ZLIB_CMF as u16) << 8 | flg as u16) % 31;
    if rem != 0 {
        flg += (31 - rem) as u8;
    }
    [ZLIB_CMF, flg]
}
