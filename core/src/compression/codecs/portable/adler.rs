//! Adler-32 (RFC 1950 section 9).

const MOD_ADLER: u32 = 65521;
/// Largest run before `b` can overflow a u32.
const NMAX: usize = 5552;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self { a: 1, b: 0 }
    }
}

impl Adler32 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                self.a += byte as u32;
                self.b += self.a;
            }
            self.a %= MOD_ADLER;
            self.b %= MOD_ADLER;
        }
    }

    pub fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }
}
