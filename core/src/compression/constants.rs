/// zlib-compatible status codes attached to compression faults.
pub mod status {
    pub const Z_OK: i32           = 0;
    pub const Z_STREAM_END: i32   = 1;
    pub const Z_NEED_DICT: i32    = 2;
    pub const Z_STREAM_ERROR: i32 = -2;
    pub const Z_DATA_ERROR: i32   = -3;
    pub const Z_BUF_ERROR: i32    = -5;
}

/// LZ77 window size (RFC 1951 maximum distance is 32768).
pub const WINDOW_SIZE: usize = 32 * 1024;
pub const WINDOW_MASK: usize = WINDOW_SIZE - 1;

pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;

/// Uncompressed bytes gathered before the portable deflater emits a block.
pub const BLOCK_INPUT_SIZE: usize = 64 * 1024;

/// Largest payload of a single stored block.
pub const MAX_STORED_BLOCK: usize = 0xffff;

/// zlib CMF byte: deflate, 32K window.
pub const ZLIB_CMF: u8 = 0x78;
pub const ZLIB_TRAILER_LEN: usize = 4;
