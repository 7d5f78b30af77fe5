//! pipeline/keys.rs
//! Session key derivation from a handshake salt and shared secret.

use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::backend::Backend;
use crate::constants::{IV_LEN_16, KEY_LEN_32, SALT_LEN_16};
use crate::crypto::DigestSession;

/// Symmetric key and CFB8 IV shared by both directions of a connection.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    pub key: [u8; KEY_LEN_32],
    pub iv: [u8; IV_LEN_16],
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys { .. }")
    }
}

/// `key = SHA-256(salt || secret)`, `iv = key[..16]`.
pub fn derive_session_keys(backend: Backend, salt: &[u8], secret: &[u8]) -> SessionKeys {
    let mut hasher = DigestSession::new(backend);
    hasher.update(salt);
    hasher.update(secret);
    let key = hasher.digest();

    let mut iv = [0u8; IV_LEN_16];
    iv.copy_from_slice(&key[..IV_LEN_16]);
    SessionKeys { key, iv }
}

/// Fresh random handshake salt.
pub fn generate_salt() -> [u8; SALT_LEN_16] {
    let mut salt = [0u8; SALT_LEN_16];
    OsRng.fill_bytes(&mut salt);
    salt
}
