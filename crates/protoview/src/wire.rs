//! Wire-level vocabulary: wire types, tags and the varint/zig-zag encoders.
//!
//! Decoding lives in [`Stream`](crate::Stream); this module only produces
//! bytes. Encoders write into a caller-provided `[u8; MAX_VARINT_LEN]` so that
//! re-encoding a scalar never allocates.

use crate::error::{Error, Result};

/// Field number as it appears in a tag (without the wire type bits).
pub type Tag = u32;

/// Longest legal varint encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// How an encoded value is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint.
    Varint = 0,
    /// Eight little-endian bytes.
    Fixed64 = 1,
    /// Varint length followed by that many bytes.
    Length = 2,
    /// Four little-endian bytes.
    Fixed32 = 5,
}

impl WireType {
    /// Wire type from the low three bits of a tag.
    ///
    /// # Errors
    ///
    /// [`Error::WireType`] for group markers (3, 4) and reserved values.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits & 7 {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::Length),
            5 => Ok(Self::Fixed32),
            other => Err(Error::WireType(other)),
        }
    }
}

/// Key of an encoded field: `(tag << 3) | wire type`.
#[must_use]
pub fn key(tag: Tag, wire_type: WireType) -> u64 {
    (u64::from(tag) << 3) | wire_type as u64
}

/// Number of bytes `value` occupies as a varint.
#[must_use]
pub fn varint_len(value: u64) -> usize {
    // zero still takes one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Encode `value` as a varint into `out`, returning the encoded prefix.
pub fn encode_varint(mut value: u64, out: &mut [u8; MAX_VARINT_LEN]) -> &[u8] {
    let mut len = 0;
    loop {
        #[expect(clippy::cast_possible_truncation)]
        let low = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out[len] = low;
            len += 1;
            break;
        }
        out[len] = low | 0x80;
        len += 1;
    }
    &out[..len]
}

/// Zig-zag encoding of a signed 32-bit value.
#[must_use]
#[expect(clippy::cast_sign_loss)]
pub fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zig-zag encoding of a signed 64-bit value.
#[must_use]
#[expect(clippy::cast_sign_loss)]
pub fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag32`].
#[must_use]
#[expect(clippy::cast_possible_wrap)]
pub fn unzigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Inverse of [`zigzag64`].
#[must_use]
#[expect(clippy::cast_possible_wrap)]
pub fn unzigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
