//! Canonical Huffman codes: length-limited construction for the encoder and a
//! count/symbol table decoder for the inflater.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::compression::codecs::portable::bits::BitReader;
use crate::compression::codecs::portable::MAX_CODE_BITS;

/// Code lengths for `freqs`, none longer than `limit`.
///
/// At least two symbols always receive a code so that every emitted code set is complete.
pub fn build_lengths(freqs: &[u32], limit: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];
    let mut used: Vec<usize> = (0..freqs.len()).filter(|&s| freqs[s] > 0).collect();

    // Pad with the lowest unused symbols.
    let mut filler = 0;
    while used.len() < 2 && filler < freqs.len() {
        if !used.contains(&filler) {
            used.push(filler);
        }
        filler += 1;
    }
    used.sort_unstable();
    if used.len() < 2 {
        for &s in &used {
            lengths[s] = 1;
        }
        return lengths;
    }

    // Plain Huffman tree. Node ids: leaves 0..n, internal nodes after.
    let n = used.len();
    let mut parent = vec![usize::MAX; 2 * n - 1];
    let mut heap = BinaryHeap::with_capacity(n);
    for (leaf, &sym) in used.iter().enumerate() {
        heap.push(Reverse((freqs[sym].max(1) as u64, leaf)));
    }
    let mut next = n;
    while heap.len() > 1 {
        let (Some(Reverse((fa, a))), Some(Reverse((fb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((fa + fb, next)));
        next += 1;
    }
    let root = next - 1;
    let mut depth = vec![0u32; 2 * n - 1];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    for (leaf, &sym) in used.iter().enumerate() {
        lengths[sym] = depth[leaf].min(u8::MAX as u32) as u8;
    }

    if lengths.iter().any(|&l| l > limit) {
        limit_lengths(&mut lengths, freqs, &used, limit);
    }
    lengths
}

/// Clamp to `limit`, then rebalance until the Kraft sum is exactly one.
fn limit_lengths(lengths: &mut [u8], freqs: &[u32], used: &[usize], limit: u8) {
    let cap = 1u64 << limit;
    let weight = |len: u8| 1u64 << (limit - len);

    for &s in used {
        lengths[s] = lengths[s].min(limit);
    }
    let mut kraft: u64 = used.iter().map(|&s| weight(lengths[s])).sum();

    // Over-subscribed: lengthen the rarest of the longest codes that can still grow.
    while kraft > cap {
        let pick = used
            .iter()
            .copied()
            .filter(|&s| lengths[s] < limit)
            .max_by_key(|&s| (lengths[s], Reverse(freqs[s])));
        let Some(s) = pick else { break };
        kraft -= weight(lengths[s] + 1);
        lengths[s] += 1;
    }

    // Under-subscribed: shorten the most frequent of the longest codes that fit.
    while kraft < cap {
        let deficit = cap - kraft;
        let pick = used
            .iter()
            .copied()
            .filter(|&s| lengths[s] > 1 && weight(lengths[s]) <= deficit)
            .max_by_key(|&s| (lengths[s], freqs[s]));
        let Some(s) = pick else { break };
        kraft += weight(lengths[s]);
        lengths[s] -= 1;
    }
}

/// Canonical codes for `lengths`, bit-reversed for an LSB-first writer.
pub fn reversed_codes(lengths: &[u8]) -> Vec<u16> {
    let mut bl_count = [0u16; 16];
    for &l in lengths {
        if l > 0 {
            bl_count[l as usize] += 1;
        }
    }
    let mut next_code = [0u16; 16];
    let mut code = 0u16;
    for bits in 1..16 {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&l| {
            if l == 0 {
                return 0;
            }
            let c = next_code[l as usize];
            next_code[l as usize] += 1;
            reverse_bits(c, l)
        })
        .collect()
}

fn reverse_bits(code: u16, len: u8) -> u16 {
    code.reverse_bits() >> (16 - len as u16)
}

/// Decoding table: code counts per length plus symbols in canonical order.
#[derive(Clone, Debug)]
pub struct Decoder {
    counts: [u16; 16],
    symbols: Vec<u16>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    OverSubscribed,
    InvalidCode,
}

impl Decoder {
    /// Build from code lengths. Incomplete sets are accepted; over-subscribed ones are not.
    pub fn new(lengths: &[u8]) -> Result<Self, DecodeError> {
        let mut counts = [0u16; 16];
        for &l in lengths {
            counts[l as usize] += 1;
        }
        let mut left: i32 = 1;
        for len in 1..=MAX_CODE_BITS as usize {
            left <<= 1;
            left -= counts[len] as i32;
            if left < 0 {
                return Err(DecodeError::OverSubscribed);
            }
        }

        let mut offsets = [0u16; 16];
        for len in 1..15 {
            offsets[len + 1] = offsets[len] + counts[len];
        }
        let coded = lengths.iter().filter(|&&l| l > 0).count();
        let mut symbols = vec![0u16; coded];
        for (sym, &l) in lengths.iter().enumerate() {
            if l > 0 {
                symbols[offsets[l as usize] as usize] = sym as u16;
                offsets[l as usize] += 1;
            }
        }
        counts[0] = 0;
        Ok(Self { counts, symbols })
    }

    /// Next symbol, or `Ok(None)` if the buffered bits run out first.
    pub fn decode(&self, reader: &mut BitReader) -> Result<Option<u16>, DecodeError> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for len in 1..=MAX_CODE_BITS as usize {
            let Some(bit) = reader.bits(1) else { return Ok(None) };
            code |= bit as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(Some(self.symbols[(index + code - first) as usize]));
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }
        Err(DecodeError::InvalidCode)
    }
}
