//! compression/codecs/portable/deflater.rs
//! Streaming LZ77 + Huffman compressor.
//!
//! Input is absorbed up to the next `BLOCK_INPUT_SIZE` boundary per call, so at most one
//! block is encoded per call; each block is encoded as stored, fixed or dynamic Huffman,
//! whichever is smallest. Encoded bytes wait in the bit writer until the caller's output
//! buffer takes them, and new input is refused (consumed = 0) while any are still waiting.

use crate::compression::codecs::portable::adler::Adler32;
use crate::compression::codecs::portable::bits::BitWriter;
use crate::compression::codecs::portable::huffman::{build_lengths, reversed_codes};
use crate::compression::codecs::portable::{
    fixed_dist_lengths, fixed_litlen_lengths, zlib_header, CODE_LENGTH_CODES, CODE_LENGTH_ORDER,
    DIST_BASE, DIST_CODES, DIST_EXTRA, END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA, LITLEN_CODES,
    MAX_CODE_BITS, MAX_CODE_LENGTH_BITS,
};
use crate::compression::constants::{
    BLOCK_INPUT_SIZE, MAX_MATCH, MAX_STORED_BLOCK, MIN_MATCH, WINDOW_MASK, WINDOW_SIZE,
};
use crate::compression::types::{stream_error, Codec, ProcessOutcome};
use crate::types::Result;

const HASH_BITS: usize = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Token {
    Literal(u8),
    Match { len: u16, dist: u16 },
}

#[derive(Copy, Clone)]
struct Params {
    max_chain: usize,
    nice_len: usize,
    lazy: bool,
}

fn params(level: u32) -> Params {
    let (max_chain, nice_len, lazy) = match level {
        1 => (4, 8, false),
        2 => (8, 16, false),
        3 => (16, 32, false),
        4 => (16, 16, true),
        5 => (32, 32, true),
        6 => (128, 128, true),
        7 => (256, 258, true),
        8 => (512, 258, true),
        _ => (1024, 258, true),
    };
    Params { max_chain, nice_len, lazy }
}

pub struct PortableDeflate {
    level: u32,
    zlib: bool,
    /// History (up to one window) followed by not yet encoded input.
    window: Vec<u8>,
    /// Stream offset of `window[0]`.
    base: usize,
    /// Index in `window` of the first byte not yet encoded.
    cursor: usize,
    /// Hash chains over stream offsets, stored as offset + 1 (0 = empty).
    head: Vec<usize>,
    prev: Vec<usize>,
    writer: BitWriter,
    adler: Adler32,
    fixed_lit: (Vec<u8>, Vec<u16>),
    fixed_dist: (Vec<u8>, Vec<u16>),
    finishing: bool,
    finished: bool,
}

impl PortableDeflate {
    pub fn new(level: u32, raw: bool) -> Self {
        let fixed_lit_lengths = fixed_litlen_lengths().to_vec();
        let fixed_dist_lengths = fixed_dist_lengths().to_vec();
        let fixed_lit_codes = reversed_codes(&fixed_lit_lengths);
        let fixed_dist_codes = reversed_codes(&fixed_dist_lengths);
        let mut deflate = Self {
            level,
            zlib: !raw,
            window: Vec::with_capacity(WINDOW_SIZE + BLOCK_INPUT_SIZE),
            base: 0,
            cursor: 0,
            head: vec![0; HASH_SIZE],
            prev: vec![0; WINDOW_SIZE],
            writer: BitWriter::new(),
            adler: Adler32::new(),
            fixed_lit: (fixed_lit_lengths, fixed_lit_codes),
            fixed_dist: (fixed_dist_lengths, fixed_dist_codes),
            finishing: false,
            finished: false,
        };
        deflate.start_stream();
        deflate
    }

    fn start_stream(&mut self) {
        if self.zlib {
            self.writer.put_bytes(&zlib_header(self.level));
        }
    }

    /// Move waiting encoded bytes into `output`.
    fn drain(&mut self, output: &mut [u8]) -> usize {
        let n = output.len().min(self.writer.bytes().len());
        if n > 0 {
            output[..n].copy_from_slice(&self.writer.bytes()[..n]);
            self.writer.discard(n);
        }
        n
    }

    fn compress_block(&mut self, len: usize, last: bool) {
        let start = self.cursor;
        let end = start + len;
        if self.level == 0 {
            write_stored(&mut self.writer, &self.window[start..end], last);
        } else {
            let tokens = self.tokenize(start, end, params(self.level));
            self.write_huffman_block(&tokens, start, end, last);
        }
        self.cursor = end;

        if self.cursor > WINDOW_SIZE {
            let drop = self.cursor - WINDOW_SIZE;
            self.window.drain(..drop);
            self.base += drop;
            self.cursor -= drop;
        }
    }

    fn hash_at(&self, idx: usize) -> usize {
        let w = &self.window;
        (((w[idx] as usize) << 10) ^ ((w[idx + 1] as usize) << 5) ^ (w[idx + 2] as usize)) & HASH_MASK
    }

    fn insert(&mut self, idx: usize) {
        if idx + MIN_MATCH > self.window.len() {
            return;
        }
        let h = self.hash_at(idx);
        let abs = self.base + idx;
        self.prev[abs & WINDOW_MASK] = self.head[h];
        self.head[h] = abs + 1;
    }

    fn longest_match(&self, idx: usize, end: usize, p: Params) -> Option<(usize, usize)> {
        let max_len = (end - idx).min(MAX_MATCH);
        if max_len < MIN_MATCH {
            return None;
        }
        let w = &self.window;
        let abs = self.base + idx;
        let mut cand = self.head[self.hash_at(idx)];
        let mut chain = p.max_chain;
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0;

        while cand != 0 && chain > 0 {
            let c = cand - 1;
            if c >= abs || abs - c >= WINDOW_SIZE || c < self.base {
                break;
            }
            let ci = c - self.base;
            if w[ci + best_len] == w[idx + best_len] {
                let mut len = 0;
                while len < max_len && w[ci + len] == w[idx + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = abs - c;
                    if len >= p.nice_len || len == max_len {
                        break;
                    }
                }
            }
            let next = self.prev[c & WINDOW_MASK];
            if next >= cand {
                break;
            }
            cand = next;
            chain -= 1;
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }

    fn tokenize(&mut self, start: usize, end: usize, p: Params) -> Vec<Token> {
        let mut tokens = Vec::with_capacity((end - start) / 2 + 1);
        let mut i = start;
        while i < end {
            let Some((len, dist)) = self.longest_match(i, end, p) else {
                self.insert(i);
                tokens.push(Token::Literal(self.window[i]));
                i += 1;
                continue;
            };

            self.insert(i);
            if p.lazy && len < p.nice_len && i + 1 < end {
                if let Some((next_len, _)) = self.longest_match(i + 1, end, p) {
                    if next_len > len {
                        tokens.push(Token::Literal(self.window[i]));
                        i += 1;
                        continue;
                    }
                }
            }
            tokens.push(Token::Match { len: len as u16, dist: dist as u16 });
            for k in i + 1..i + len {
                self.insert(k);
            }
            i += len;
        }
        tokens
    }

    fn write_huffman_block(&mut self, tokens: &[Token], start: usize, end: usize, last: bool) {
        let mut lit_freq = vec![0u32; LITLEN_CODES];
        let mut dist_freq = vec![0u32; DIST_CODES];
        let mut extra_bits: u64 = 0;
        for token in tokens {
            match *token {
                Token::Literal(b) => lit_freq[b as usize] += 1,
                Token::Match { len, dist } => {
                    let (lc, _) = length_code(len);
                    let (dc, _) = dist_code(dist);
                    lit_freq[257 + lc] += 1;
                    dist_freq[dc] += 1;
                    extra_bits += (LENGTH_EXTRA[lc] + DIST_EXTRA[dc]) as u64;
                }
            }
        }
        lit_freq[END_OF_BLOCK as usize] += 1;

        let plan = DynamicPlan::new(&lit_freq, &dist_freq);
        let dynamic_bits = plan.header_bits()
            + weighted(&lit_freq, &plan.lit_lengths)
            + weighted(&dist_freq, &plan.dist_lengths)
            + extra_bits;
        let fixed_bits = 3
            + weighted(&lit_freq, &self.fixed_lit.0)
            + weighted(&dist_freq, &self.fixed_dist.0)
            + extra_bits;
        let stored_bits = stored_cost(end - start);

        if stored_bits < dynamic_bits.min(fixed_bits) {
            write_stored(&mut self.writer, &self.window[start..end], last);
        } else if fixed_bits <= dynamic_bits {
            self.writer.put(last as u32, 1);
            self.writer.put(1, 2);
            emit_tokens(
                &mut self.writer,
                tokens,
                (self.fixed_lit.0.as_slice(), self.fixed_lit.1.as_slice()),
                (self.fixed_dist.0.as_slice(), self.fixed_dist.1.as_slice()),
            );
        } else {
            self.writer.put(last as u32, 1);
            self.writer.put(2, 2);
            plan.write_header(&mut self.writer);
            let lit_codes = reversed_codes(&plan.lit_lengths);
            let dist_codes = reversed_codes(&plan.dist_lengths);
            emit_tokens(
                &mut self.writer,
                tokens,
                (plan.lit_lengths.as_slice(), lit_codes.as_slice()),
                (plan.dist_lengths.as_slice(), dist_codes.as_slice()),
            );
        }
    }
}

impl Codec for PortableDeflate {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome> {
        if self.finished {
            return Ok(ProcessOutcome::ended());
        }
        let mut produced = self.drain(output);

        if !input.is_empty() {
            if self.finishing {
                return Err(stream_error("input supplied after end of stream was requested"));
            }
            if !self.writer.bytes().is_empty() {
                return Ok(ProcessOutcome::new(produced, 0, false));
            }
            let pending = self.window.len() - self.cursor;
            let take = input.len().min(BLOCK_INPUT_SIZE - pending);
            let input = &input[..take];
            self.adler.update(input);
            self.window.extend_from_slice(input);
            if self.window.len() - self.cursor == BLOCK_INPUT_SIZE {
                self.compress_block(BLOCK_INPUT_SIZE, false);
            }
            produced += self.drain(&mut output[produced..]);
            return Ok(ProcessOutcome::new(produced, take, false));
        }

        if !self.finishing {
            self.finishing = true;
            let rest = self.window.len() - self.cursor;
            self.compress_block(rest, true);
            self.writer.align();
            if self.zlib {
                let trailer = self.adler.value().to_be_bytes();
                self.writer.put_bytes(&trailer);
            }
            produced += self.drain(&mut output[produced..]);
        }
        self.finished = self.writer.bytes().is_empty();
        Ok(ProcessOutcome::new(produced, 0, self.finished))
    }

    fn reset(&mut self) {
        self.window.clear();
        self.base = 0;
        self.cursor = 0;
        self.head.iter_mut().for_each(|h| *h = 0);
        self.prev.iter_mut().for_each(|p| *p = 0);
        self.writer.clear();
        self.adler = Adler32::new();
        self.finishing = false;
        self.finished = false;
        self.start_stream();
    }
}

/// Code lengths and header layout of a dynamic block.
struct DynamicPlan {
    lit_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    /// Run-length coded lengths as (symbol, extra value).
    runs: Vec<(u8, u8)>,
    cl_lengths: Vec<u8>,
}

impl DynamicPlan {
    fn new(lit_freq: &[u32], dist_freq: &[u32]) -> Self {
        let lit_lengths = build_lengths(lit_freq, MAX_CODE_BITS);
        let dist_lengths = build_lengths(dist_freq, MAX_CODE_BITS);
        let hlit = last_nonzero(&lit_lengths).max(257);
        let hdist = last_nonzero(&dist_lengths).max(1);

        let mut runs = Vec::new();
        run_length_code(&lit_lengths[..hlit], &mut runs);
        run_length_code(&dist_lengths[..hdist], &mut runs);

        let mut cl_freq = vec![0u32; CODE_LENGTH_CODES];
        for &(sym, _) in &runs {
            cl_freq[sym as usize] += 1;
        }
        let cl_lengths = build_lengths(&cl_freq, MAX_CODE_LENGTH_BITS);
        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&s| cl_lengths[s] > 0)
            .map_or(4, |p| (p + 1).max(4));

        Self { lit_lengths, dist_lengths, hlit, hdist, hclen, runs, cl_lengths }
    }

    fn header_bits(&self) -> u64 {
        let runs: u64 = self
            .runs
            .iter()
            .map(|&(sym, _)| (self.cl_lengths[sym as usize] + run_extra_bits(sym)) as u64)
            .sum();
        3 + 5 + 5 + 4 + 3 * self.hclen as u64 + runs
    }

    fn write_header(&self, writer: &mut BitWriter) {
        writer.put((self.hlit - 257) as u32, 5);
        writer.put((self.hdist - 1) as u32, 5);
        writer.put((self.hclen - 4) as u32, 4);
        for &sym in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.put(self.cl_lengths[sym] as u32, 3);
        }
        let cl_codes = reversed_codes(&self.cl_lengths);
        for &(sym, extra) in &self.runs {
            let s = sym as usize;
            writer.put(cl_codes[s] as u32, self.cl_lengths[s] as u32);
            writer.put(extra as u32, run_extra_bits(sym) as u32);
        }
    }
}

fn last_nonzero(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l > 0).map_or(0, |p| p + 1)
}

fn run_extra_bits(sym: u8) -> u8 {
    match sym {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

fn run_length_code(lengths: &[u8], out: &mut Vec<(u8, u8)>) {
    let mut i = 0;
    while i < lengths.len() {
        let l = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == l {
            run += 1;
        }
        if l == 0 {
            let mut left = run;
            while left >= 11 {
                let n = left.min(138);
                out.push((18, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                out.push((17, (left - 3) as u8));
                left = 0;
            }
            out.extend(std::iter::repeat((0, 0)).take(left));
        } else {
            out.push((l, 0));
            let mut left = run - 1;
            while left >= 3 {
                let n = left.min(6);
                out.push((16, (n - 3) as u8));
                left -= n;
            }
            out.extend(std::iter::repeat((l, 0)).take(left));
        }
        i += run;
    }
}

fn weighted(freqs: &[u32], lengths: &[u8]) -> u64 {
    freqs.iter().zip(lengths).map(|(&f, &l)| f as u64 * l as u64).sum()
}

fn stored_cost(len: usize) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    blocks * (3 + 7 + 32) + 8 * len as u64
}

fn length_code(len: u16) -> (usize, u16) {
    let idx = LENGTH_BASE.iter().rposition(|&b| b <= len).unwrap_or(0);
    (idx, len - LENGTH_BASE[idx])
}

fn dist_code(dist: u16) -> (usize, u16) {
    let idx = DIST_BASE.iter().rposition(|&b| b <= dist).unwrap_or(0);
    (idx, dist - DIST_BASE[idx])
}

fn write_stored(writer: &mut BitWriter, data: &[u8], last: bool) {
    let mut chunks: Vec<&[u8]> = data.chunks(MAX_STORED_BLOCK).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }
    let count = chunks.len();
    for (n, chunk) in chunks.into_iter().enumerate() {
        let final_block = last && n + 1 == count;
        writer.put(final_block as u32, 1);
        writer.put(0, 2);
        writer.align();
        let len = chunk.len() as u16;
        writer.put_bytes(&len.to_le_bytes());
        writer.put_bytes(&(!len).to_le_bytes());
        writer.put_bytes(chunk);
    }
}

fn emit_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    lit: (&[u8], &[u16]),
    dist: (&[u8], &[u16]),
) {
    let (lit_lengths, lit_codes) = lit;
    let (dist_lengths, dist_codes) = dist;
    for token in tokens {
        match *token {
            Token::Literal(b) => {
                writer.put(lit_codes[b as usize] as u32, lit_lengths[b as usize] as u32);
            }
            Token::Match { len, dist } => {
                let (lc, lextra) = length_code(len);
                let sym = 257 + lc;
                writer.put(lit_codes[sym] as u32, lit_lengths[sym] as u32);
                writer.put(lextra as u32, LENGTH_EXTRA[lc] as u32);
                let (dc, dextra) = dist_code(dist);
                writer.put(dist_codes[dc] as u32, dist_lengths[dc] as u32);
                writer.put(dextra as u32, DIST_EXTRA[dc] as u32);
            }
        }
    }
    let eob = END_OF_BLOCK as usize;
    writer.put(lit_codes[eob] as u32, lit_lengths[eob] as u32);
}
