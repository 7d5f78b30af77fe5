//! LSB-first bit packing as used by DEFLATE.

use bytes::{Buf, BufMut, BytesMut};

#[derive(Default)]
pub struct BitWriter {
    out: BytesMut,
    acc: u64,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `n` bits of `value` (n <= 32).
    pub fn put(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }
        self.acc |= ((value as u64) & ((1u64 << n) - 1)) << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.out.put_u8(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    /// Pad with zero bits to the next byte boundary.
    pub fn align(&mut self) {
        if self.nbits > 0 {
            self.out.put_u8(self.acc as u8);
            self.acc = 0;
            self.nbits = 0;
        }
    }

    /// Append whole bytes. The writer must be byte aligned.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.nbits, 0);
        self.out.extend_from_slice(bytes);
    }

    /// Completed bytes not yet handed out.
    pub fn bytes(&self) -> &[u8] {
        &self.out
    }

    /// Drop the first `n` completed bytes.
    pub fn discard(&mut self, n: usize) {
        self.out.advance(n);
    }

    pub fn clear(&mut self) {
        self.out.clear();
        self.acc = 0;
        self.nbits = 0;
    }
}

/// Reads bits out of a growable buffer without advancing on underrun.
#[derive(Default)]
pub struct BitReader {
    buf: BytesMut,
    pos: usize,
}

impl BitReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Release fully read bytes from the front.
    pub fn compact(&mut self) {
        let whole = self.pos / 8;
        if whole > 0 {
            self.buf.advance(whole);
            self.pos -= whole * 8;
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn available_bits(&self) -> usize {
        self.buf.len() * 8 - self.pos
    }

    /// Buffered bytes the reader has not touched yet.
    pub fn untouched_bytes(&self) -> usize {
        self.buf.len() - (self.pos + 7) / 8
    }

    /// Forget the last `n` buffered bytes, which must be untouched.
    pub fn unpush(&mut self, n: usize) {
        debug_assert!(n <= self.untouched_bytes());
        let len = self.buf.len() - n;
        self.buf.truncate(len);
    }

    pub fn bits(&mut self, n: u32) -> Option<u32> {
        if (n as usize) > self.available_bits() {
            return None;
        }
        let mut value = 0u32;
        let mut got = 0u32;
        while got < n {
            let byte = self.buf[self.pos >> 3] as u32;
            let offset = (self.pos & 7) as u32;
            let take = (8 - offset).min(n - got);
            value |= ((byte >> offset) & ((1 << take) - 1)) << got;
            got += take;
            self.pos += take as usize;
        }
        Some(value)
    }

    pub fn align(&mut self) {
        self.pos = (self.pos + 7) & !7;
    }

    /// Byte-aligned bulk copy; returns how many bytes were copied.
    pub fn copy_bytes(&mut self, dst: &mut [u8]) -> usize {
        debug_assert_eq!(self.pos & 7, 0);
        let start = self.pos / 8;
        let n = dst.len().min(self.buf.len() - start);
        dst[..n].copy_from_slice(&self.buf[start..start + n]);
        self.pos += n * 8;
        n
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_reader_agree() {
        let mut w = BitWriter::new();
        w.put(1, 1);
        w.put(0b10, 2);
        w.put(0x1abc, 13);
        w.put(0x3, 2);
        w.align();
        let bytes = w.bytes().to_vec();

        let mut r = BitReader::new();
        r.push(&bytes);
        assert_eq!(r.bits(1), Some(1));
        assert_eq!(r.bits(2), Some(0b10));
        assert_eq!(r.bits(13), Some(0x1abc));
        assert_eq!(r.bits(2), Some(0x3));
    }

    #[test]
    fn underrun_does_not_advance() {
        let mut r = BitReader::new();
        r.push(&[0xff]);
        assert_eq!(r.bits(5), Some(0x1f));
        assert_eq!(r.bits(4), None);
        assert_eq!(r.position(), 5);
        r.push(&[0x01]);
        assert_eq!(r.bits(4), Some(0b1111));
    }
}
