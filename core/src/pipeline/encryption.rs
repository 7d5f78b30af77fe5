//! pipeline/encryption.rs
//! Packet sealing: 8-byte keyed checksum, then AES-256-CFB8 over payload and checksum.
//!
//! Wire layout of a sealed packet (before encryption):
//!
//! ```text
//! [ payload (n) ][ SHA-256(counter_le64 || payload || key)[..8] ]
//! ```
//!
//! Both ends keep their own packet counter starting at zero. Every packet advances the
//! cipher stream and the counter, whether or not it verifies, so one bad packet does not
//! desynchronize the ones after it.

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use crate::backend::Backend;
use crate::constants::{CHECKSUM_LEN_8, DIGEST_LEN_32, KEY_LEN_32};
use crate::crypto::{CipherSession, DigestSession, Direction};
use crate::pipeline::keys::SessionKeys;
use crate::pipeline::types::PacketError;
use crate::utils::ct_eq;

struct Checksummer {
    hasher: DigestSession,
    key: SessionKeys,
}

impl Checksummer {
    fn compute(&mut self, counter: u64, payload: &[u8]) -> [u8; DIGEST_LEN_32] {
        let mut counter_le = [0u8; 8];
        LittleEndian::write_u64(&mut counter_le, counter);
        self.hasher.update(&counter_le);
        self.hasher.update(payload);
        self.hasher.update(&self.key.key[..KEY_LEN_32]);
        self.hasher.digest()
    }
}

pub struct PacketEncryptor {
    cipher: CipherSession,
    checksum: Checksummer,
    counter: u64,
}

impl PacketEncryptor {
    pub fn new(cipher_backend: Backend, digest_backend: Backend, keys: &SessionKeys) -> Result<Self, PacketError> {
        Ok(Self {
            cipher: CipherSession::new(cipher_backend, Direction::Encrypt, &keys.key, &keys.iv)?,
            checksum: Checksummer { hasher: DigestSession::new(digest_backend), key: keys.clone() },
            counter: 0,
        })
    }

    /// Packets sealed so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn seal(&mut self, payload: &[u8]) -> Vec<u8> {
        let digest = self.checksum.compute(self.counter, payload);
        self.counter = self.counter.wrapping_add(1);

        let mut packet = Vec::with_capacity(payload.len() + CHECKSUM_LEN_8);
        packet.extend_from_slice(payload);
        packet.extend_from_slice(&digest[..CHECKSUM_LEN_8]);
        self.cipher.process_in_place(&mut packet);
        packet
    }
}

pub struct PacketDecryptor {
    cipher: CipherSession,
    checksum: Checksummer,
    counter: u64,
}

impl PacketDecryptor {
    pub fn new(cipher_backend: Backend, digest_backend: Backend, keys: &SessionKeys) -> Result<Self, PacketError> {
        Ok(Self {
            cipher: CipherSession::new(cipher_backend, Direction::Decrypt, &keys.key, &keys.iv)?,
            checksum: Checksummer { hasher: DigestSession::new(digest_backend), key: keys.clone() },
            counter: 0,
        })
    }

    /// Packets opened so far, including rejected ones.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Decrypt and verify one packet, returning its payload.
    pub fn open(&mut self, packet: &[u8]) -> Result<Vec<u8>, PacketError> {
        let mut plain = self.cipher.process_to_vec(packet);
        let counter = self.counter;
        self.counter = self.counter.wrapping_add(1);

        if plain.len() < CHECKSUM_LEN_8 {
            warn!(counter, len = plain.len(), "truncated packet");
            return Err(PacketError::Truncated { len: plain.len(), min: CHECKSUM_LEN_8 });
        }
        let body_len = plain.len() - CHECKSUM_LEN_8;
        let expected = self.checksum.compute(counter, &plain[..body_len]);
        if !ct_eq(&expected[..CHECKSUM_LEN_8], &plain[body_len..]) {
            warn!(counter, "packet checksum mismatch");
            return Err(PacketError::ChecksumMismatch { counter });
        }
        plain.truncate(body_len);
        Ok(plain)
    }
}
