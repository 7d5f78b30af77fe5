//! crypto/sha256.rs
//! Portable SHA-256 (FIPS 180-4).

use zeroize::Zeroize;

use crate::constants::{DIGEST_LEN_32, SHA256_BLOCK_LEN};
use crate::crypto::types::HashEngine;

const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Running SHA-256 state.
///
/// `pending` never holds a full block between calls; `total_len` counts every byte fed
/// since the last reset and drives the length padding.
#[derive(Clone)]
pub struct Sha256Portable {
    state: [u32; 8],
    pending: [u8; SHA256_BLOCK_LEN],
    pending_len: usize,
    total_len: u64,
}

impl Default for Sha256Portable {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256Portable {
    pub fn new() -> Self {
        Self { state: H0, pending: [0; SHA256_BLOCK_LEN], pending_len: 0, total_len: 0 }
    }

    pub fn reset(&mut self) {
        self.pending.zeroize();
        *self = Self::new();
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.total_len = self.total_len.wrapping_add(data.len() as u64);

        if self.pending_len > 0 {
            let take = (SHA256_BLOCK_LEN - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];
            if self.pending_len < SHA256_BLOCK_LEN {
                return;
            }
            let block = self.pending;
            compress(&mut self.state, &block);
            self.pending_len = 0;
        }

        let mut blocks = data.chunks_exact(SHA256_BLOCK_LEN);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }
        let rest = blocks.remainder();
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
    }

    /// Pad and emit the digest, then return to the initial constants.
    pub fn finalize_reset(&mut self) -> [u8; DIGEST_LEN_32] {
        let bit_len = self.total_len.wrapping_mul(8);

        let mut tail = [0u8; 2 * SHA256_BLOCK_LEN];
        tail[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
        tail[self.pending_len] = 0x80;
        let tail_len = if self.pending_len + 1 + 8 <= SHA256_BLOCK_LEN {
            SHA256_BLOCK_LEN
        } else {
            2 * SHA256_BLOCK_LEN
        };
        tail[tail_len - 8..tail_len].copy_from_slice(&bit_len.to_be_bytes());
        for block in tail[..tail_len].chunks_exact(SHA256_BLOCK_LEN) {
            compress(&mut self.state, block);
        }
        tail.zeroize();

        let mut out = [0u8; DIGEST_LEN_32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        self.reset();
        out
    }
}

impl HashEngine for Sha256Portable {
    fn update(&mut self, data: &[u8]) {
        Sha256Portable::update(self, data);
    }

    fn finalize_reset(&mut self) -> [u8; DIGEST_LEN_32] {
        Sha256Portable::finalize_reset(self)
    }
}

impl Drop for Sha256Portable {
    fn drop(&mut self) {
        self.state.zeroize();
        self.pending.zeroize();
    }
}

/// One-shot digest on the portable implementation.
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LEN_32] {
    let mut h = Sha256Portable::new();
    h.update(data);
    h.finalize_reset()
}

fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), SHA256_BLOCK_LEN);

    let mut w = [0u32; 64];
    for (t, word) in block.chunks_exact(4).enumerate() {
        w[t] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for t in 16..64 {
        let s0 = w[t - 15].rotate_right(7) ^ w[t - 15].rotate_right(18) ^ (w[t - 15] >> 3);
        let s1 = w[t - 2].rotate_right(17) ^ w[t - 2].rotate_right(19) ^ (w[t - 2] >> 10);
        w[t] = w[t - 16].wrapping_add(s0).wrapping_add(w[t - 7]).wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for t in 0..64 {
        let big_s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(big_s1)
            .wrapping_add(ch)
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let big_s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = big_s0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_boundary_lengths_match_split_updates() {
        // 55, 56 and 64 bytes straddle the one-block/two-block padding boundary.
        for len in [0usize, 1, 55, 56, 63, 64, 65, 119, 120, 128] {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let whole = sha256(&data);

            let mut h = Sha256Portable::new();
            for b in &data {
                h.update(std::slice::from_ref(b));
            }
            assert_eq!(h.finalize_reset(), whole, "len={}", len);
        }
    }

    #[test]
    fn finalize_resets_to_initial_state() {
        let mut h = Sha256Portable::new();
        h.update(b"something");
        let _ = h.finalize_reset();
        assert_eq!(h.state, H0);
        assert_eq!(h.pending_len, 0);
        assert_eq!(h.total_len, 0);
    }
}
