//! crypto/mod.rs
//! AES-256-CFB8 cipher and SHA-256 digest sessions over pluggable engines.

pub mod types;
pub mod aes;
pub mod sha256;
pub mod native;
pub mod registry;
pub mod cfb8;
pub mod digest;

pub use types::*;
pub use cfb8::CipherSession;
pub use digest::DigestSession;
pub use sha256::sha256;
