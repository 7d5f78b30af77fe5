//! compression/codecs/deflate.rs
//! Native DEFLATE/INFLATE via flate2, driven through raw `Compress`/`Decompress` state.
//!
//! Per-call counts come from `total_in`/`total_out` deltas, so partial progress is reported
//! exactly even when flate2 stops early on a full output buffer.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::compression::constants::status;
use crate::compression::types::{buf_error, data_error, Codec, ProcessOutcome};
use crate::types::{PrimitiveError, Result};

pub struct NativeDeflate {
    inner: Compress,
    finished: bool,
}

impl NativeDeflate {
    pub fn new(level: u32, raw: bool) -> Self {
        Self { inner: Compress::new(Compression::new(level), !raw), finished: false }
    }
}

impl Codec for NativeDeflate {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome> {
        if self.finished {
            return Ok(ProcessOutcome::ended());
        }
        let flush = if input.is_empty() { FlushCompress::Finish } else { FlushCompress::None };

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let state = self
            .inner
            .compress(input, output, flush)
            .map_err(|e| PrimitiveError::CompressionFault {
                code: status::Z_STREAM_ERROR,
                message: e.to_string(),
            })?;
        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        match state {
            Status::Ok => {}
            Status::StreamEnd => self.finished = true,
            Status::BufError => return Err(buf_error("deflate")),
        }
        Ok(ProcessOutcome::new(produced, consumed, self.finished))
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.finished = false;
    }
}

pub struct NativeInflate {
    inner: Decompress,
    zlib_header: bool,
    finished: bool,
}

impl NativeInflate {
    pub fn new(raw: bool) -> Self {
        Self { inner: Decompress::new(!raw), zlib_header: !raw, finished: false }
    }
}

impl Codec for NativeInflate {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessOutcome> {
        if self.finished {
            return Ok(ProcessOutcome::ended());
        }
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let state = self
            .inner
            .decompress(input, output, FlushDecompress::Sync)
            .map_err(|e| {
                if e.needs_dictionary().is_some() {
                    PrimitiveError::CompressionFault {
                        code: status::Z_NEED_DICT,
                        message: "stream requires a preset dictionary".into(),
                    }
                } else {
                    data_error(e.to_string())
                }
            })?;
        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        match state {
            Status::Ok => {}
            Status::StreamEnd => self.finished = true,
            Status::BufError => return Err(buf_error("inflate")),
        }
        Ok(ProcessOutcome::new(produced, consumed, self.finished))
    }

    fn reset(&mut self) {
        self.inner.reset(self.zlib_header);
        self.finished = false;
    }
}
