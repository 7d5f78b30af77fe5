//! crypto/aes.rs
//! Portable AES-256 forward cipher (FIPS 197).
//!
//! Table-free except for the S-box; state is kept column-major as in the standard
//! (byte `r + 4c` is row `r`, column `c`).

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{AES256_ROUNDS, AES256_SCHEDULE_WORDS, BLOCK_LEN_16, KEY_LEN_32};
use crate::crypto::types::BlockEncryptor;

const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

const RCON: [u8; 8] = [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40];

/// Expanded AES-256 encryption schedule (60 words, 15 round keys).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes256Portable {
    round_keys: [[u8; BLOCK_LEN_16]; AES256_ROUNDS + 1],
}

impl Aes256Portable {
    pub fn new(key: &[u8; KEY_LEN_32]) -> Self {
        const NK: usize = KEY_LEN_32 / 4;
        let mut w = [[0u8; 4]; AES256_SCHEDULE_WORDS];
        for (i, word) in w.iter_mut().take(NK).enumerate() {
            word.copy_from_slice(&key[4 * i..4 * i + 4]);
        }

        for i in NK..AES256_SCHEDULE_WORDS {
            let mut temp = w[i - 1];
            if i % NK == 0 {
                temp.rotate_left(1);
                temp = sub_word(temp);
                temp[0] ^= RCON[i / NK];
            } else if i % NK == 4 {
                temp = sub_word(temp);
            }
            for b in 0..4 {
                w[i][b] = w[i - NK][b] ^ temp[b];
            }
        }

        let mut round_keys = [[0u8; BLOCK_LEN_16]; AES256_ROUNDS + 1];
        for (round, rk) in round_keys.iter_mut().enumerate() {
            for col in 0..4 {
                rk[4 * col..4 * col + 4].copy_from_slice(&w[4 * round + col]);
            }
        }
        w.zeroize();

        Self { round_keys }
    }

    pub fn encrypt(&self, block: &mut [u8; BLOCK_LEN_16]) {
        add_round_key(block, &self.round_keys[0]);
        for round in 1..AES256_ROUNDS {
            sub_bytes(block);
            shift_rows(block);
            mix_columns(block);
            add_round_key(block, &self.round_keys[round]);
        }
        sub_bytes(block);
        shift_rows(block);
        add_round_key(block, &self.round_keys[AES256_ROUNDS]);
    }
}

impl BlockEncryptor for Aes256Portable {
    #[inline]
    fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN_16]) {
        self.encrypt(block);
    }
}

#[inline]
fn sub_word(w: [u8; 4]) -> [u8; 4] {
    [SBOX[w[0] as usize], SBOX[w[1] as usize], SBOX[w[2] as usize], SBOX[w[3] as usize]]
}

#[inline]
fn add_round_key(state: &mut [u8; BLOCK_LEN_16], rk: &[u8; BLOCK_LEN_16]) {
    for (s, k) in state.iter_mut().zip(rk.iter()) {
        *s ^= k;
    }
}

#[inline]
fn sub_bytes(state: &mut [u8; BLOCK_LEN_16]) {
    for b in state.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

/// Row `r` rotates left by `r` columns.
#[inline]
fn shift_rows(state: &mut [u8; BLOCK_LEN_16]) {
    let s = *state;
    for col in 0..4 {
        for row in 1..4 {
            state[row + 4 * col] = s[row + 4 * ((col + row) % 4)];
        }
    }
}

#[inline]
fn xtime(a: u8) -> u8 {
    (a << 1) ^ (((a >> 7) & 1) * 0x1b)
}

#[inline]
fn mix_columns(state: &mut [u8; BLOCK_LEN_16]) {
    for col in state.chunks_exact_mut(4) {
        let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ all ^ xtime(a0 ^ a1);
        col[1] = a1 ^ all ^ xtime(a1 ^ a2);
        col[2] = a2 ^ all ^ xtime(a2 ^ a3);
        col[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // FIPS 197 Appendix C.3
    #[test]
    fn fips197_aes256_known_answer() {
        let mut key = [0u8; 32];
        for (i, k) in key.iter_mut().enumerate() {
            *k = i as u8;
        }
        let mut block = [0u8; 16];
        for (i, b) in block.iter_mut().enumerate() {
            *b = (i as u8) * 0x11;
        }

        Aes256Portable::new(&key).encrypt(&mut block);
        assert_eq!(
            block,
            [
                0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf,
                0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49, 0x60, 0x89,
            ]
        );
    }

    #[test]
    fn mix_columns_matches_fips_example() {
        // db 13 53 45 -> 8e 4d a1 bc
        let mut state = [0u8; 16];
        state[..4].copy_from_slice(&[0xdb, 0x13, 0x53, 0x45]);
        mix_columns(&mut state);
        assert_eq!(&state[..4], &[0x8e, 0x4d, 0xa1, 0xbc]);
    }
}
