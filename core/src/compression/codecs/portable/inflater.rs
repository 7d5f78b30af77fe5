//! compression/codecs/portable/inflater.rs
//! Resumable DEFLATE decoder.
//!
//! Every call emits all output that the buffered input allows. A step that runs out of
//! bits is rolled back to its start and retried on the next call, so partially received
//! symbols or block headers never corrupt state. Bytes after the end of the stream are
//! handed back uncounted.

use crate::compression::codecs::portable::adler::Adler32;
use crate::compression::codecs::portable::bits::BitReader;
use crate::compression::codecs::portable::huffman::{DecodeError, Decoder};
use crate::compression::codecs::portable::{
    fixed_dist_lengths, fixed_litlen_lengths, CODE_LENGTH_CODES, CODE_LENGTH_ORDER, DIST_BASE,
    DIST_EXTRA, END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA,
};
use crate::compression::constants::{status, WINDOW_MASK, WINDOW_SIZE, ZLIB_TRAILER_LEN};
use crate::compression::types::{buf_error, data_error, Codec, ProcessOutcome};
use crate::types::{PrimitiveError, Result};

const INPUT_SLACK: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Header,
    BlockHeader,
    Stored { remaining: usize },
    Codes,
    Copy { len: usize, dist: usize },
    Trailer,
    Done,
}

enum Flow {
    Continue,
    NeedInput,
    OutputFull,
    Done,
}

impl From<DecodeError> for PrimitiveError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::OverSubscribed => data_error("over-subscribed huffman code"),
            DecodeError::InvalidCode    => data_error("invalid huffman code"),
        }
    }
}

pub struct PortableInflate {
    zlib: bool,
    reader: BitReader,
    state: State,
    last_block: bool,
    lit: Option<Decoder>,
    dist: Option<Decoder>,
    history: Vec<u8>,
    history_pos: usize,
    history_len: usize,
    adler: Adler32,
}

impl PortableInflate {
    pub fn new(raw: bool) -> Self {
        Self {
            zlib: !raw,
            reader: BitReader::new(),
            state: if raw { State::BlockHeader } else { State::Header },
            last_block: false,
            lit: None,
            dist: None,
            history: vec![0; WINDOW_SIZE],
            history_pos: 0,
            history_len: 0,
            adler: Adler32::new(),
        }
    }

    fn emit(&mut self, byte: u8, output: &mut [u8], produced: &mut usize) {
        output[*produced] = byte;
        *produced += 1;
        self.history[self.history_pos] = byte;
        self.history_pos = (self.history_pos + 1) & WINDOW_MASK;
        if self.history_len < WINDOW_SIZE {
            self.history_len += 1;
        }
    }

    fn step(&mut self, output: &mut [u8], produced: &mut usize, synced: &mut usize) -> Result<Flow> {
        match self.state {
            State::Header => {
                let (Some(cmf), Some(flg)) = (self.reader.bits(8), self.reader.bits(8)) else {
                    return Ok(Flow::NeedInput);
                };
                if cmf & 0x0f != 8 {
                    return Err(data_error("unknown compression method"));
                }
                if (cmf >> 4) > 7 {
                    return Err(data_error("invalid window size"));
                }
                if ((cmf << 8) | flg) % 31 != 0 {
                    return Err(data_error("incorrect header check"));
                }
                if flg & 0x20 != 0 {
                    return Err(PrimitiveError::CompressionFault {
                        code: status::Z_NEED_DICT,
                        message: "stream requires a preset dictionary".into(),
                    });
                }
                self.state = State::BlockHeader;
                Ok(Flow::Continue)
            }

            State::BlockHeader => {
                let (Some(last), Some(kind)) = (self.reader.bits(1), self.reader.bits(2)) else {
                    return Ok(Flow::NeedInput);
                };
                match kind {
                    0 => {
                        self.reader.align();
                        let (Some(len), Some(nlen)) = (self.reader.bits(16), self.reader.bits(16)) else {
                            return Ok(Flow::NeedInput);
                        };
                        if len != (!nlen & 0xffff) {
                            return Err(data_error("invalid stored block lengths"));
                        }
                        self.state = State::Stored { remaining: len as usize };
                    }
                    1 => {
                        self.lit = Some(Decoder::new(&fixed_litlen_lengths())?);
                        self.dist = Some(Decoder::new(&fixed_dist_lengths())?);
                        self.state = State::Codes;
                    }
                    2 => {
                        let Some((lit, dist)) = self.read_dynamic_tables()? else {
                            return Ok(Flow::NeedInput);
                        };
                        self.lit = Some(lit);
                        self.dist = Some(dist);
                        self.state = State::Codes;
                    }
                    _ => return Err(data_error("invalid block type")),
                }
                self.last_block = last == 1;
                Ok(Flow::Continue)
            }

            State::Stored { remaining } => {
                if remaining == 0 {
                    self.end_block();
                    return Ok(Flow::Continue);
                }
                if *produced == output.len() {
                    return Ok(Flow::OutputFull);
                }
                let room = (output.len() - *produced).min(remaining);
                let start = *produced;
                let n = self.reader.copy_bytes(&mut output[start..start + room]);
                if n == 0 {
                    return Ok(Flow::NeedInput);
                }
                for k in start..start + n {
                    self.history[self.history_pos] = output[k];
                    self.history_pos = (self.history_pos + 1) & WINDOW_MASK;
                }
                self.history_len = (self.history_len + n).min(WINDOW_SIZE);
                *produced += n;
                self.state = State::Stored { remaining: remaining - n };
                Ok(Flow::Continue)
            }

            State::Codes => {
                if *produced == output.len() {
                    return Ok(Flow::OutputFull);
                }
                let (Some(lit), Some(dist)) = (self.lit.as_ref(), self.dist.as_ref()) else {
                    return Err(data_error("missing huffman tables"));
                };
                let Some(sym) = lit.decode(&mut self.reader)? else {
                    return Ok(Flow::NeedInput);
                };
                match sym {
                    0..=255 => {
                        self.emit(sym as u8, output, produced);
                        Ok(Flow::Continue)
                    }
                    END_OF_BLOCK => {
                        self.end_block();
                        Ok(Flow::Continue)
                    }
                    257..=285 => {
                        let idx = (sym - 257) as usize;
                        let Some(extra) = self.reader.bits(LENGTH_EXTRA[idx] as u32) else {
                            return Ok(Flow::NeedInput);
                        };
                        let len = LENGTH_BASE[idx] as usize + extra as usize;
                        let Some(dsym) = dist.decode(&mut self.reader)? else {
                            return Ok(Flow::NeedInput);
                        };
                        let dsym = dsym as usize;
                        if dsym >= DIST_BASE.len() {
                            return Err(data_error("invalid distance code"));
                        }
                        let Some(dextra) = self.reader.bits(DIST_EXTRA[dsym] as u32) else {
                            return Ok(Flow::NeedInput);
                        };
                        let dist = DIST_BASE[dsym] as usize + dextra as usize;
                        if dist > self.history_len {
                            return Err(data_error("invalid distance too far back"));
                        }
                        self.state = State::Copy { len, dist };
                        Ok(Flow::Continue)
                    }
                    _ => Err(data_error("invalid literal/length code")),
                }
            }

            State::Copy { len, dist } => {
                let room = output.len() - *produced;
                let n = len.min(room);
                for _ in 0..n {
                    let byte = self.history[(self.history_pos + WINDOW_SIZE - dist) & WINDOW_MASK];
                    self.emit(byte, output, produced);
                }
                if n < len {
                    self.state = State::Copy { len: len - n, dist };
                    return Ok(Flow::OutputFull);
                }
                self.state = State::Codes;
                Ok(Flow::Continue)
            }

            State::Trailer => {
                self.reader.align();
                if self.reader.available_bits() < ZLIB_TRAILER_LEN * 8 {
                    return Ok(Flow::NeedInput);
                }
                let mut expected = 0u32;
                for _ in 0..ZLIB_TRAILER_LEN {
                    let byte = self.reader.bits(8).unwrap_or(0);
                    expected = (expected << 8) | byte;
                }
                self.adler.update(&output[*synced..*produced]);
                *synced = *produced;
                if expected != self.adler.value() {
                    return Err(data_error("incorrect data check"));
                }
                self.state = State::Done;
                Ok(Flow::Done)
            }

            State::Done => Ok(Flow::Done),
        }
    }

    fn end_block(&mut self) {
        self.lit = None;
        self.dist = None;
        self.state = match (self.last_block, self.zlib) {
            (false, _)    => State::BlockHeader,
            (true, true)  => State::Trailer,
            (true, false) => State::Done,
        };
    }

    /// Parse a dynamic block's code tables, or `None` if the header is not fully buffered.
    fn read_dynamic_tables(&mut self) -> Result<Option<(Decoder, Decoder)>> {
        let r = &mut self.reader;
        let (Some(hlit), Some(hdist), Some(hclen)) = (r.bits(5), r.bits(5), r.bits(4)) else {
            return Ok(None);
        };
        let hlit = hlit as usize + 257;
        let hdist = hdist as usize + 1;
        let hclen = hclen as usize + 4;
        if hlit > 286 || hdist > 30 {
            return Err(data_error("too many length or distance symbols"));
        }

        let mut cl_lengths = [0u8; CODE_LENGTH_CODES];
        for &sym in &CODE_LENGTH_ORDER[..hclen] {
            let Some(l) = r.bits(3) else { return Ok(None) };
            cl_lengths[sym] = l as u8;
        }
        let cl = Decoder::new(&cl_lengths)?;

        let mut lengths = vec![0u8; hlit + hdist];
        let mut i = 0;
        while i < lengths.len() {
            let Some(sym) = cl.decode(r)? else { return Ok(None) };
            let (value, repeat) = match sym {
                0..=15 => (sym as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(data_error("invalid bit length repeat"));
                    }
                    let Some(extra) = r.bits(2) else { return Ok(None) };
                    (lengths[i - 1], 3 + extra as usize)
                }
                17 => {
                    let Some(extra) = r.bits(3) else { return Ok(None) };
                    (0, 3 + extra as usize)
                }
                _ => {
                    let Some(extra) = r.bits(7) else { return Ok(None) };
                    (0, 11 + extra as usize)
                }
            };
            if i + repeat > lengths.len() {
                return Err(data_error("invalid bit length repeat"));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }
        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(data_error("invalid code -- missing end-of-block"));
        }

        let lit = Decoder::new(&lengths[..hlit])?;
        let dist = Decoder::new(&lengths[hlit..])?;
        Ok(Some((lit, dist)))
    }
}

impl Codec for PortableInflate {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome> {
        if self.state == State::Done {
            return Ok(ProcessOutcome::ended());
        }
        self.reader.compact();
        // One output byte never needs more than two input bytes, plus room for block headers.
        let take = input.len().min(output.len().saturating_mul(2).saturating_add(INPUT_SLACK));
        let input = &input[..take];
        self.reader.push(input);

        let mut produced = 0;
        let mut synced = 0;
        let flow = loop {
            let mark = self.reader.position();
            match self.step(output, &mut produced, &mut synced)? {
                Flow::Continue => continue,
                Flow::NeedInput => {
                    self.reader.rewind(mark);
                    break Flow::NeedInput;
                }
                other => break other,
            }
        };
        self.adler.update(&output[synced..produced]);

        // Only input needed to make progress counts as consumed; an unread tail from
        // this call goes back to the caller.
        let consumed = match flow {
            Flow::NeedInput => input.len(),
            _ => {
                let give_back = self.reader.untouched_bytes().min(input.len());
                self.reader.unpush(give_back);
                input.len() - give_back
            }
        };
        let finished = self.state == State::Done;
        if produced == 0 && consumed == 0 && !finished {
            return Err(buf_error("inflate"));
        }
        Ok(ProcessOutcome::new(produced, consumed, finished))
    }

    fn reset(&mut self) {
        self.reader.clear();
        self.state = if self.zlib { State::Header } else { State::BlockHeader };
        self.last_block = false;
        self.lit = None;
        self.dist = None;
        self.history_pos = 0;
        self.history_len = 0;
        self.adler = Adler32::new();
    }
}
