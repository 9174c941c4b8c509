#![allow(missing_docs, dead_code)]

use std::fmt::Write;

use protoview::{DefaultValue, Descriptor, FieldDescriptor, Label, Type};

// message PhoneNumber { optional string number = 1; optional PhoneType type = 2 [default = HOME]; }
pub static PHONE_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(1, "number", Type::String, Label::Optional),
    FieldDescriptor::new(2, "type", Type::Enum, Label::Optional)
        .with_default(DefaultValue::I32(1)),
];
pub static PHONE: Descriptor = Descriptor::new("PhoneNumber", &PHONE_FIELDS);

// message Person {
//   optional string name = 1;
//   optional int32 id = 2;
//   optional string email = 3;
//   repeated PhoneNumber phones = 4;
//   repeated int32 lucky = 5 [packed = true];
// }
pub static PERSON_FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor::new(1, "name", Type::String, Label::Optional),
    FieldDescriptor::new(2, "id", Type::Int32, Label::Optional),
    FieldDescriptor::new(3, "email", Type::String, Label::Optional),
    FieldDescriptor::new(4, "phones", Type::Message, Label::Repeated).nested(&PHONE),
    FieldDescriptor::new(5, "lucky", Type::Int32, Label::Repeated).packed(),
];
pub static PERSON: Descriptor = Descriptor::new("Person", &PERSON_FIELDS);

#[rustfmt::skip]
pub const ALICE: [u8; 18] = [
    0x0a, 0x05, b'A', b'l', b'i', b'c', b'e',           // name = "Alice"
    0x10, 0x7b,                                         // id = 123
    0x22, 0x07, 0x0a, 0x03, b'5', b'5', b'5', 0x10, 0x02, // phones { number = "555" type = WORK }
];

/// Space separated lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{byte:02x}").unwrap();
    }
    out
}
