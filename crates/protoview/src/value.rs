use alloc::string::String;

use bstr::BString;

use crate::{
    descriptor::Type,
    error::{Error, Result},
    stream::Stream,
    wire::{self, MAX_VARINT_LEN},
};

/// A decoded scalar, string or bytes value.
///
/// The variant names the Rust representation only; the field's declared
/// [`Type`] decides how it is encoded. `I32(-1)` is written as a ten byte
/// varint into an `int32` field, as a one byte zig-zag varint into a `sint32`
/// field and as four bytes into an `sfixed32` field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `int32`, `sint32`, `sfixed32` and `enum`
    I32(i32),
    /// `int64`, `sint64` and `sfixed64`
    I64(i64),
    /// `uint32` and `fixed32`
    U32(u32),
    /// `uint64` and `fixed64`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(BString),
}

impl Value {
    /// Decode the payload of one value of type `ty`.
    ///
    /// For length-delimited types `payload` is the content without its length
    /// prefix; for all other types it is exactly one encoded value.
    ///
    /// # Errors
    ///
    /// Stream errors for short or malformed input, [`Error::Utf8`] for a
    /// `string` holding invalid UTF-8 and [`Error::Invalid`] for
    /// [`Type::Message`], which has no scalar value.
    pub fn decode(ty: Type, payload: &[u8]) -> Result<Self> {
        match ty {
            Type::String => core::str::from_utf8(payload)
                .map(|s| Self::String(s.into()))
                .map_err(|_| Error::Utf8),
            Type::Bytes => Ok(Self::Bytes(BString::from(payload))),
            Type::Message => Err(Error::Invalid),
            _ => Stream::new(payload).read(ty),
        }
    }

    /// Encode the value for a field of type `ty`.
    ///
    /// Numeric encodings are written to `scratch`; strings and bytes are
    /// returned as borrowed content (without length prefix).
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the variant cannot represent `ty`.
    pub fn encode<'a>(&'a self, ty: Type, scratch: &'a mut [u8; MAX_VARINT_LEN]) -> Result<&'a [u8]> {
        let bytes: &[u8] = match (ty, self) {
            (Type::Int32 | Type::Enum, Self::I32(v)) => {
                // sign-extended, so negative values take ten bytes
                #[expect(clippy::cast_sign_loss)]
                let raw = i64::from(*v) as u64;
                wire::encode_varint(raw, scratch)
            }
            (Type::Int64, Self::I64(v)) => {
                #[expect(clippy::cast_sign_loss)]
                let raw = *v as u64;
                wire::encode_varint(raw, scratch)
            }
            (Type::UInt32, Self::U32(v)) => wire::encode_varint(u64::from(*v), scratch),
            (Type::UInt64, Self::U64(v)) => wire::encode_varint(*v, scratch),
            (Type::SInt32, Self::I32(v)) => {
                wire::encode_varint(u64::from(wire::zigzag32(*v)), scratch)
            }
            (Type::SInt64, Self::I64(v)) => wire::encode_varint(wire::zigzag64(*v), scratch),
            (Type::Bool, Self::Bool(v)) => wire::encode_varint(u64::from(*v), scratch),
            (Type::Fixed32, Self::U32(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::SFixed32, Self::I32(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::Float, Self::F32(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::Fixed64, Self::U64(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::SFixed64, Self::I64(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::Double, Self::F64(v)) => fixed(&v.to_le_bytes(), scratch),
            (Type::String, Self::String(v)) => v.as_bytes(),
            (Type::Bytes, Self::Bytes(v)) => v.as_slice(),
            _ => return Err(Error::Invalid),
        };
        Ok(bytes)
    }
}

fn fixed<'a, const N: usize>(bytes: &[u8; N], scratch: &'a mut [u8; MAX_VARINT_LEN]) -> &'a [u8] {
    scratch[..N].copy_from_slice(bytes);
    &scratch[..N]
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(BString::from(value))
    }
}
