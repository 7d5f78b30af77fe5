//! constants.rs
//! Fixed sizes and defaults shared across the primitives.

/// AES-256 key length in bytes.
pub const KEY_LEN_32: usize = 32;

/// AES block length in bytes (also the CFB8 feedback register size).
pub const BLOCK_LEN_16: usize = 16;

/// CFB8 initialization vector length in bytes.
pub const IV_LEN_16: usize = BLOCK_LEN_16;

/// AES-256 round count.
pub const AES256_ROUNDS: usize = 14;

/// Expanded AES-256 key schedule length in 32-bit words.
pub const AES256_SCHEDULE_WORDS: usize = 4 * (AES256_ROUNDS + 1);

/// SHA-256 message block length in bytes.
pub const SHA256_BLOCK_LEN: usize = 64;

/// SHA-256 digest length in bytes.
pub const DIGEST_LEN_32: usize = 32;

/// Default deflate level used by the protocol pipeline.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 7;

/// Highest accepted deflate level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Output chunk size used when draining a compression session.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// A fresh output chunk is started once fewer bytes than this remain.
pub const DEFAULT_CHUNK_FLOOR: usize = 512;

/// Packet checksum length appended by the packet encryptor.
pub const CHECKSUM_LEN_8: usize = 8;

/// Salt length used for session key derivation.
pub const SALT_LEN_16: usize = 16;

/// Backend identifiers (stable, mirrored by `Backend`).
pub mod backend_ids {
    pub const PORTABLE: u16 = 0x0001;
    pub const NATIVE: u16   = 0x0002;
}
