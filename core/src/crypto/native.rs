//! crypto/native.rs
//! Native backend: RustCrypto `aes` and `sha2`.
//!
//! Both crates detect CPU support at runtime (AES-NI / ARMv8 crypto, SHA-NI) and fall
//! back to their own constant-time software paths otherwise.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use sha2::{Digest, Sha256};

use crate::constants::{BLOCK_LEN_16, DIGEST_LEN_32, KEY_LEN_32};
use crate::crypto::types::{BlockEncryptor, HashEngine};

/// `aes::Aes256` behind the block seam. Key schedule is zeroized on drop
/// (the crate's `zeroize` feature).
pub struct Aes256Native {
    cipher: Aes256,
}

impl Aes256Native {
    pub fn new(key: &[u8; KEY_LEN_32]) -> Self {
        Self { cipher: Aes256::new(GenericArray::from_slice(key)) }
    }
}

impl BlockEncryptor for Aes256Native {
    #[inline]
    fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN_16]) {
        self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

#[derive(Default)]
pub struct Sha256Native {
    hasher: Sha256,
}

impl HashEngine for Sha256Native {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize_reset(&mut self) -> [u8; DIGEST_LEN_32] {
        let digest = self.hasher.finalize_reset();
        let mut out = [0u8; DIGEST_LEN_32];
        out.copy_from_slice(&digest);
        out
    }
}
