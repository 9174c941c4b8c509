//! Forward-only decoder over a byte range.
//!
//! A `Stream` never backtracks and knows nothing about mutation: callers
//! that need to re-read take a fresh stream over the (possibly realigned)
//! sub-range.

use crate::{
    descriptor::Type,
    error::{Error, Result},
    value::Value,
    wire::{self, MAX_VARINT_LEN, WireType},
};

/// Sequential reader over a byte range.
#[derive(Debug, Clone)]
pub struct Stream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Stream<'a> {
    /// Stream over all of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Stream over `data`, starting `offset` bytes in.
    ///
    /// An offset past the end yields an exhausted stream.
    #[must_use]
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset.min(data.len()),
        }
    }

    /// Bytes consumed so far, counted from the start of the range.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes remaining.
    #[must_use]
    pub fn left(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Skip exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if fewer than `n` bytes remain; the stream does
    /// not move in that case.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.left() {
            return Err(Error::Truncated);
        }
        self.pos += n;
        Ok(())
    }

    /// Decode one varint.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if the input ends inside the varint,
    /// [`Error::MalformedVarint`] if no terminating byte appears within ten
    /// bytes and [`Error::Overflow`] if the tenth byte carries bits beyond
    /// the 64th.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.data.get(self.pos + i) else {
                return Err(Error::Truncated);
            };
            if i == MAX_VARINT_LEN - 1 && byte & 0x80 == 0 && byte > 1 {
                return Err(Error::Overflow);
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                self.pos += i + 1;
                return Ok(value);
            }
        }
        Err(Error::MalformedVarint)
    }

    /// Decode a varint that must fit into 32 bits (tags, lengths, `uint32`).
    ///
    /// # Errors
    ///
    /// As [`read_varint`](Self::read_varint), plus [`Error::Overflow`] for
    /// values above `u32::MAX`.
    pub fn read_varint32(&mut self) -> Result<u32> {
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| Error::Overflow)
    }

    /// Read four little-endian bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if fewer than four bytes remain.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read eight little-endian bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if fewer than eight bytes remain.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Read a varint length followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Varint errors for the length, [`Error::Truncated`] if the content is
    /// shorter than announced.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint32()? as usize;
        let start = self.pos;
        self.advance(len)?;
        Ok(&self.data[start..self.pos])
    }

    /// Decode one value of type `ty`.
    ///
    /// Length-delimited types read their length prefix first.
    ///
    /// # Errors
    ///
    /// Decode errors as above, [`Error::Overflow`] for a varint outside the
    /// range of a 32-bit type and [`Error::Invalid`] for
    /// [`Type::Message`].
    pub fn read(&mut self, ty: Type) -> Result<Value> {
        let value = match ty {
            Type::Int32 | Type::Enum => Value::I32(narrow_signed(self.read_varint()?)?),
            #[expect(clippy::cast_possible_wrap)]
            Type::Int64 => Value::I64(self.read_varint()? as i64),
            Type::UInt32 => Value::U32(self.read_varint32()?),
            Type::UInt64 => Value::U64(self.read_varint()?),
            Type::SInt32 => Value::I32(wire::unzigzag32(self.read_varint32()?)),
            Type::SInt64 => Value::I64(wire::unzigzag64(self.read_varint()?)),
            Type::Bool => Value::Bool(self.read_varint()? != 0),
            Type::Fixed32 => Value::U32(self.read_fixed32()?),
            Type::Fixed64 => Value::U64(self.read_fixed64()?),
            Type::SFixed32 => Value::I32(i32::from_le_bytes(self.take_array()?)),
            Type::SFixed64 => Value::I64(i64::from_le_bytes(self.take_array()?)),
            Type::Float => Value::F32(f32::from_le_bytes(self.take_array()?)),
            Type::Double => Value::F64(f64::from_le_bytes(self.take_array()?)),
            Type::String | Type::Bytes => Value::decode(ty, self.read_length_delimited()?)?,
            Type::Message => return Err(Error::Invalid),
        };
        Ok(value)
    }

    /// Skip one encoded value of the given wire type without decoding it.
    ///
    /// # Errors
    ///
    /// Any decode error met while determining the value's extent.
    pub fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(drop),
            WireType::Fixed64 => self.advance(8),
            WireType::Length => self.read_length_delimited().map(drop),
            WireType::Fixed32 => self.advance(4),
        }
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let start = self.pos;
        self.advance(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[start..self.pos]);
        Ok(out)
    }
}

// `int32` is sign-extended to 64 bits on the wire
fn narrow_signed(raw: u64) -> Result<i32> {
    #[expect(clippy::cast_possible_wrap)]
    let wide = raw as i64;
    i32::try_from(wide).map_err(|_| Error::Overflow)
}
