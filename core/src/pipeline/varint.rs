//! pipeline/varint.rs
//! Unsigned LEB128 lengths used by batch framing.

use bytes::{Buf, BufMut};

use crate::pipeline::types::PacketError;

/// Longest encoding of a u32.
pub const MAX_VARINT_LEN: usize = 5;
/// Shifts beyond this mean the value is wider than 35 bits.
const MAX_SHIFT: u32 = 35;

pub fn write_varint(mut value: u32, buf: &mut impl BufMut) {
    while value & !0x7f != 0 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

pub fn read_varint(buf: &mut impl Buf) -> Result<u64, PacketError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    while shift <= MAX_SHIFT {
        if !buf.has_remaining() {
            return Err(PacketError::MalformedBatch("varint cut short".into()));
        }
        let head = buf.get_u8();
        value |= ((head & 0x7f) as u64) << shift;
        if head & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(PacketError::MalformedBatch("varint wider than 35 bits".into()))
}
