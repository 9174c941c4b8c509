//! Read-only schema tables.
//!
//! Descriptors are produced offline from a schema definition and are only
//! ever consumed here as immutable lookup tables. Everything is `const`
//! constructible so that generated code can emit plain `static` items:
//!
//! ```
//! use protoview::{Descriptor, FieldDescriptor, Label, Type};
//!
//! static POINT_FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::new(1, "x", Type::SInt32, Label::Optional),
//!     FieldDescriptor::new(2, "y", Type::SInt32, Label::Optional),
//! ];
//! static POINT: Descriptor = Descriptor::new("Point", &POINT_FIELDS);
//!
//! assert_eq!(POINT.field_by_tag(2).map(|f| f.name), Some("y"));
//! ```

use core::fmt;

use bstr::BString;

use crate::{
    value::Value,
    wire::{Tag, WireType},
};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Signed varint, negative values take ten bytes.
    Int32,
    /// Signed varint.
    Int64,
    /// Unsigned varint.
    UInt32,
    /// Unsigned varint.
    UInt64,
    /// Zig-zag varint.
    SInt32,
    /// Zig-zag varint.
    SInt64,
    /// Four little-endian bytes, unsigned.
    Fixed32,
    /// Eight little-endian bytes, unsigned.
    Fixed64,
    /// Four little-endian bytes, signed.
    SFixed32,
    /// Eight little-endian bytes, signed.
    SFixed64,
    /// IEEE 754 single precision.
    Float,
    /// IEEE 754 double precision.
    Double,
    /// Varint 0 or 1.
    Bool,
    /// Enumeration, encoded like `Int32`.
    Enum,
    /// Length-delimited UTF-8.
    String,
    /// Length-delimited bytes.
    Bytes,
    /// Length-delimited submessage.
    Message,
}

impl Type {
    /// Wire type a non-packed occurrence of this type uses.
    #[must_use]
    pub const fn wire_type(self) -> WireType {
        match self {
            Self::Int32
            | Self::Int64
            | Self::UInt32
            | Self::UInt64
            | Self::SInt32
            | Self::SInt64
            | Self::Bool
            | Self::Enum => WireType::Varint,
            Self::Fixed64 | Self::SFixed64 | Self::Double => WireType::Fixed64,
            Self::Fixed32 | Self::SFixed32 | Self::Float => WireType::Fixed32,
            Self::String | Self::Bytes | Self::Message => WireType::Length,
        }
    }
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// At most one value; the last occurrence on the wire wins.
    Optional,
    /// Exactly one value; the last occurrence on the wire wins.
    Required,
    /// Any number of values, possibly packed.
    Repeated,
    /// Member of a `oneof` group; the last member written wins.
    Oneof,
}

/// Default value of a field, as declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// Boolean default.
    Bool(bool),
    /// Default for 32-bit signed types and enums.
    I32(i32),
    /// Default for 64-bit signed types.
    I64(i64),
    /// Default for 32-bit unsigned types.
    U32(u32),
    /// Default for 64-bit unsigned types.
    U64(u64),
    /// Default for `float`.
    F32(f32),
    /// Default for `double`.
    F64(f64),
    /// Default for `string`.
    Str(&'static str),
    /// Default for `bytes`.
    Bytes(&'static [u8]),
}

impl DefaultValue {
    /// Owned value equivalent to this default.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(v),
            Self::I32(v) => Value::I32(v),
            Self::I64(v) => Value::I64(v),
            Self::U32(v) => Value::U32(v),
            Self::U64(v) => Value::U64(v),
            Self::F32(v) => Value::F32(v),
            Self::F64(v) => Value::F64(v),
            Self::Str(v) => Value::String(v.into()),
            Self::Bytes(v) => Value::Bytes(BString::from(v)),
        }
    }
}

/// Layout of one field of a message.
pub struct FieldDescriptor {
    /// Field number.
    pub tag: Tag,
    /// Field name, for diagnostics.
    pub name: &'static str,
    /// Declared type.
    pub ty: Type,
    /// Cardinality.
    pub label: Label,
    /// `oneof` group the field belongs to, if any.
    pub oneof: Option<u32>,
    /// Whether a repeated scalar is written as one packed blob.
    pub packed: bool,
    /// Descriptor of the submessage, for [`Type::Message`] fields.
    pub nested: Option<&'static Descriptor>,
    /// Schema default, returned by message-level reads of absent fields.
    pub default: Option<DefaultValue>,
}

impl FieldDescriptor {
    /// Plain field without group, packing, submessage or default.
    #[must_use]
    pub const fn new(tag: Tag, name: &'static str, ty: Type, label: Label) -> Self {
        Self {
            tag,
            name,
            ty,
            label,
            oneof: None,
            packed: false,
            nested: None,
            default: None,
        }
    }

    /// Place the field in `oneof` group `group`; the label becomes
    /// [`Label::Oneof`].
    #[must_use]
    pub const fn in_oneof(mut self, group: u32) -> Self {
        self.oneof = Some(group);
        self.label = Label::Oneof;
        self
    }

    /// Mark a repeated scalar as packed.
    #[must_use]
    pub const fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// Attach the submessage descriptor of a [`Type::Message`] field.
    #[must_use]
    pub const fn nested(mut self, descriptor: &'static Descriptor) -> Self {
        self.nested = Some(descriptor);
        self
    }

    /// Attach a schema default.
    #[must_use]
    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Declared wire type of a single (non-packed) value.
    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        self.ty.wire_type()
    }

    /// Cardinality of the field.
    #[must_use]
    pub const fn label(&self) -> Label {
        self.label
    }

    /// `oneof` group of the field, if any.
    #[must_use]
    pub const fn oneof(&self) -> Option<u32> {
        self.oneof
    }

    /// Whether the field is declared packed.
    ///
    /// Reading accepts packed and unpacked occurrences either way; this only
    /// decides how [`Message::put`](crate::Message::put) appends.
    #[must_use]
    pub const fn is_packed(&self) -> bool {
        self.packed
    }

    /// Whether the field holds a submessage.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self.ty, Type::Message)
    }
}

// Nested descriptors print by name; schemas may be recursive.
impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("label", &self.label)
            .field("oneof", &self.oneof)
            .field("packed", &self.packed)
            .field("nested", &self.nested.map(|nested| nested.name))
            .field("default", &self.default)
            .finish()
    }
}

/// Layout of a message: its fields, in tag order.
#[derive(Debug)]
pub struct Descriptor {
    /// Message name, for diagnostics.
    pub name: &'static str,
    /// Field table.
    pub fields: &'static [FieldDescriptor],
}

impl Descriptor {
    /// Descriptor over a static field table.
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// Field declared with `tag`, if any.
    #[must_use]
    pub fn field_by_tag(&self, tag: Tag) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Members of the `oneof` group `group`.
    pub fn oneof_members(&self, group: u32) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| field.oneof == Some(group))
    }
}
