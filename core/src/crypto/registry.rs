//! crypto/registry.rs
//! Backend factories for the block cipher and hash engines.

use crate::backend::Backend;
use crate::constants::KEY_LEN_32;
use crate::crypto::aes::Aes256Portable;
use crate::crypto::native::{Aes256Native, Sha256Native};
use crate::crypto::sha256::Sha256Portable;
use crate::crypto::types::{BlockEncryptor, HashEngine};

pub fn create_block_encryptor(backend: Backend, key: &[u8; KEY_LEN_32]) -> Box<dyn BlockEncryptor> {
    match backend {
        Backend::Portable => Box::new(Aes256Portable::new(key)),
        Backend::Native   => Box::new(Aes256Native::new(key)),
    }
}

pub fn create_hash_engine(backend: Backend) -> Box<dyn HashEngine> {
    match backend {
        Backend::Portable => Box::new(Sha256Portable::new()),
        Backend::Native   => Box::new(Sha256Native::default()),
    }
}
