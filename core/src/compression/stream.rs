//! compression/stream.rs
//! Whole-buffer helpers that drive a session to `finished` in chunk_size steps.
use crate::compression::constants::status;
use crate::compression::session::CompressionSession;
use crate::compression::types::Mode;
use crate::types::{PrimitiveError, Result};

fn wrong_mode(expected: Mode) -> PrimitiveError {
    PrimitiveError::CompressionFault {
        code: status::Z_STREAM_ERROR,
        message: format!("session is not in {expected} mode"),
    }
}

/// Summary: Compress `input` as one complete stream, draining output chunk_size at a time.
/// - Feeds input until fully consumed, then requests end of stream until finished.
/// - Resets the session afterwards so it can take the next stream.
pub fn compress_all(session: &mut CompressionSession, input: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    if session.mode() != Mode::Compress {
        return Err(wrong_mode(Mode::Compress));
    }
    let mut out = Vec::with_capacity(input.len() / 2 + 16);
    let mut buf = vec![0u8; chunk_size.max(1)];

    let mut rest = input;
    while !rest.is_empty() {
        let step = session.process(rest, &mut buf)?;
        out.extend_from_slice(&buf[..step.produced]);
        rest = &rest[step.consumed..];
    }
    loop {
        let step = session.process(&[], &mut buf)?;
        out.extend_from_slice(&buf[..step.produced]);
        if step.finished {
            break;
        }
    }
    session.reset()?;
    Ok(out)
}

/// Summary: Inflate one complete stream from `input`.
/// - Bytes after the end of stream are ignored.
/// - A stream that ends early fails with `Z_BUF_ERROR` and, like any fault, poisons the session.
/// - Resets the session after a complete stream.
pub fn decompress_all(session: &mut CompressionSession, input: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    if session.mode() != Mode::Decompress {
        return Err(wrong_mode(Mode::Decompress));
    }
    let mut out = Vec::with_capacity(input.len() * 2);
    let mut buf = vec![0u8; chunk_size.max(1)];

    let mut rest = input;
    loop {
        let step = session.process(rest, &mut buf)?;
        out.extend_from_slice(&buf[..step.produced]);
        rest = &rest[step.consumed..];
        if step.finished {
            break;
        }
    }
    session.reset()?;
    Ok(out)
}
