//! pipeline/batch.rs
//! Batch framing: varint-prefixed packets deflated as one stream per flush.
//!
//! Small packets are staged and deflated together; a packet that would not fit in the
//! staging area is deflated straight after its length prefix. Output is collected in
//! chunk_size pieces, and a new piece is started once less than chunk_floor remains.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::backend::Backend;
use crate::compression::{status, CompressionSession, Mode};
use crate::config::PrimitivesConfig;
use crate::pipeline::types::PacketError;
use crate::pipeline::varint::{read_varint, write_varint, MAX_VARINT_LEN};

/// Deflated bytes pending in a batch before `should_flush` asks for a flush.
pub const BATCH_FLUSH_THRESHOLD: usize = 128 * 1024;

/// Output piece currently being filled.
struct Chunk {
    buf: Vec<u8>,
    filled: usize,
    floor: usize,
}

impl Chunk {
    fn new(size: usize, floor: usize) -> Self {
        Self { buf: vec![0; size.max(1)], filled: 0, floor: floor.max(1) }
    }

    /// Start a fresh piece if the current one is nearly full.
    fn ensure_floor(&mut self, out: &mut BytesMut) {
        if self.buf.len() - self.filled < self.floor {
            self.seal(out);
        }
    }

    fn seal(&mut self, out: &mut BytesMut) {
        out.extend_from_slice(&self.buf[..self.filled]);
        self.filled = 0;
    }

    fn spare(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }
}

pub struct BatchCompressor {
    session: CompressionSession,
    staging: BytesMut,
    staging_cap: usize,
    chunk: Chunk,
    out: BytesMut,
    packets: usize,
}

impl BatchCompressor {
    pub fn new(backend: Backend, level: u32, raw: bool, chunk_size: usize, chunk_floor: usize) -> Result<Self, PacketError> {
        Ok(Self {
            session: CompressionSession::new(backend, Mode::Compress, level, raw)?,
            staging: BytesMut::with_capacity(chunk_size),
            staging_cap: chunk_size,
            chunk: Chunk::new(chunk_size, chunk_floor),
            out: BytesMut::new(),
            packets: 0,
        })
    }

    pub fn from_config(config: &PrimitivesConfig) -> Result<Self, PacketError> {
        Self::new(
            config.compression_backend,
            config.compression_level,
            config.raw_deflate,
            config.chunk_size,
            config.chunk_floor,
        )
    }

    /// Packets added since the last flush.
    pub fn pending_packets(&self) -> usize {
        self.packets
    }

    /// True once enough deflated output is pending that the batch should be sent.
    pub fn should_flush(&self) -> bool {
        self.out.len() + self.chunk.filled > BATCH_FLUSH_THRESHOLD
    }

    /// Append one packet. Empty packets are skipped.
    pub fn push(&mut self, packet: &[u8]) -> Result<(), PacketError> {
        if packet.is_empty() {
            return Ok(());
        }
        let len = u32::try_from(packet.len())
            .map_err(|_| PacketError::MalformedBatch(format!("packet of {} bytes too large", packet.len())))?;

        if packet.len() + MAX_VARINT_LEN >= self.staging_cap - self.staging.len() {
            self.deflate_staging()?;
            let mut header = BytesMut::with_capacity(MAX_VARINT_LEN);
            write_varint(len, &mut header);
            self.deflate(&header)?;
            self.deflate(packet)?;
        } else {
            write_varint(len, &mut self.staging);
            self.staging.extend_from_slice(packet);
        }
        self.packets += 1;
        Ok(())
    }

    /// Finish the stream and hand back the batch; the compressor is ready for the next one.
    /// Returns `None` when nothing was pushed.
    pub fn flush(&mut self) -> Result<Option<Bytes>, PacketError> {
        if self.packets == 0 {
            return Ok(None);
        }
        self.deflate_staging()?;
        loop {
            self.chunk.ensure_floor(&mut self.out);
            let step = self.session.process(&[], self.chunk.spare())?;
            self.chunk.filled += step.produced;
            if step.finished {
                break;
            }
        }
        self.chunk.seal(&mut self.out);
        self.session.reset()?;

        debug!(packets = self.packets, bytes = self.out.len(), "batch flushed");
        self.packets = 0;
        Ok(Some(self.out.split().freeze()))
    }

    fn deflate_staging(&mut self) -> Result<(), PacketError> {
        if self.staging.is_empty() {
            return Ok(());
        }
        let staged = self.staging.split();
        self.deflate(&staged)
    }

    fn deflate(&mut self, mut input: &[u8]) -> Result<(), PacketError> {
        while !input.is_empty() {
            self.chunk.ensure_floor(&mut self.out);
            let step = self.session.process(input, self.chunk.spare())?;
            self.chunk.filled += step.produced;
            input = &input[step.consumed..];
        }
        Ok(())
    }
}

pub struct BatchDecompressor {
    session: CompressionSession,
    chunk_size: usize,
    chunk_floor: usize,
}

impl BatchDecompressor {
    pub fn new(backend: Backend, raw: bool, chunk_size: usize, chunk_floor: usize) -> Result<Self, PacketError> {
        Ok(Self {
            session: CompressionSession::new(backend, Mode::Decompress, 0, raw)?,
            chunk_size,
            chunk_floor,
        })
    }

    pub fn from_config(config: &PrimitivesConfig) -> Result<Self, PacketError> {
        Self::new(config.compression_backend, config.raw_deflate, config.chunk_size, config.chunk_floor)
    }

    /// Inflate one batch and split it into packets.
    pub fn decode(&mut self, batch: &[u8]) -> Result<Vec<Bytes>, PacketError> {
        let inflated = self.inflate(batch);
        let inflated = match inflated {
            Ok(bytes) => bytes,
            Err(e) => {
                // A fault poisons the session; start over with a clean one.
                if self.session.is_poisoned() {
                    self.session = CompressionSession::new(self.session.backend(), Mode::Decompress, 0, self.session.raw())?;
                } else {
                    self.session.reset()?;
                }
                return Err(e);
            }
        };
        self.session.reset()?;
        trace!(batch = batch.len(), inflated = inflated.len(), "batch inflated");
        split_packets(inflated)
    }

    fn inflate(&mut self, batch: &[u8]) -> Result<Bytes, PacketError> {
        let mut out = BytesMut::with_capacity(batch.len() * 4);
        let mut chunk = Chunk::new(self.chunk_size, self.chunk_floor);
        let mut rest = batch;
        loop {
            chunk.ensure_floor(&mut out);
            let step = match self.session.process(rest, chunk.spare()) {
                Ok(step) => step,
                Err(e) if rest.is_empty() && e.status_code() == Some(status::Z_BUF_ERROR) => {
                    return Err(PacketError::MalformedBatch("compressed stream ended early".into()));
                }
                Err(e) => return Err(e.into()),
            };
            chunk.filled += step.produced;
            rest = &rest[step.consumed..];
            if step.finished {
                break;
            }
        }
        chunk.seal(&mut out);
        Ok(out.freeze())
    }
}

fn split_packets(mut inflated: Bytes) -> Result<Vec<Bytes>, PacketError> {
    let mut packets = Vec::new();
    while inflated.has_remaining() {
        let len = read_varint(&mut inflated)?;
        let len = usize::try_from(len)
            .ok()
            .filter(|&l| l <= inflated.remaining())
            .ok_or_else(|| {
                PacketError::MalformedBatch(format!(
                    "packet length {len} overruns {} remaining bytes",
                    inflated.remaining()
                ))
            })?;
        packets.push(inflated.split_to(len));
    }
    Ok(packets)
}
