#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use protoview::{
    Cursor, Descriptor, Error, FieldDescriptor, Journal, JournalOptions, Label, Message, Type,
    Value,
};

static NODE_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor::new(1, "value", Type::Int32, Label::Optional),
    FieldDescriptor::new(2, "name", Type::String, Label::Optional),
    FieldDescriptor::new(3, "child", Type::Message, Label::Optional).nested(&NODE),
    FieldDescriptor::new(4, "points", Type::SInt32, Label::Repeated).packed(),
    FieldDescriptor::new(5, "count", Type::UInt64, Label::Optional).in_oneof(0),
    FieldDescriptor::new(6, "blob", Type::Bytes, Label::Optional).in_oneof(0),
];
static NODE: Descriptor = Descriptor::new("Node", &NODE_FIELDS);

#[derive(Debug, Arbitrary)]
enum Op {
    Resolve(u8),
    Next,
    Rewind,
    Get,
    PutInt(i32),
    PutText(String),
    Erase,
    Descend,
    Within,
    MessagePut(u8, u64),
    EraseTag(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    bytes: Vec<u8>,
    ops: Vec<Op>,
}

/// Every field of every reachable submessage decodes up to the end.
fn well_formed(message: &Message) -> bool {
    let mut cursor = Cursor::raw(message, 0);
    while cursor.is_valid() {
        let nested = cursor.descriptor().is_some_and(FieldDescriptor::is_message);
        if nested {
            match Message::from_cursor(&mut cursor) {
                Ok(child) if well_formed(&child) => {}
                _ => return false,
            }
        } else if matches!(cursor.get(), Err(err) if err != Error::Utf8) {
            return false;
        }
        cursor.next();
    }
    cursor.error() == Some(Error::EndOfMessage)
}

fn value_for(tag: u32, raw: u64) -> Value {
    match tag {
        2 => Value::String(raw.to_string()),
        5 => Value::U64(raw),
        6 => Value::from(&raw.to_le_bytes()[..]),
        _ => Value::I32(raw as i32),
    }
}

fn run(input: Input) {
    let journal = Journal::with_options(input.bytes, JournalOptions {
        panic_on_error: false,
        ..Default::default()
    });
    let root = Message::new(&journal, &NODE);
    let valid_before = well_formed(&root);

    let mut message = root.clone();
    let mut cursor = Cursor::raw(&message, 0);
    for op in input.ops {
        match op {
            Op::Resolve(tag) => cursor = Cursor::new(&message, u32::from(tag % 7)),
            Op::Next => {
                cursor.next();
            }
            Op::Rewind => {
                cursor.rewind();
            }
            Op::Get => {
                let _ = cursor.get();
            }
            Op::PutInt(v) => {
                let _ = cursor.put(&Value::I32(v));
            }
            Op::PutText(s) => {
                let _ = cursor.put(&Value::from(s));
            }
            Op::Erase => {
                let _ = cursor.erase();
            }
            Op::Descend => {
                if let Ok(child) = Message::from_cursor(&mut cursor) {
                    message = child;
                    cursor = Cursor::raw(&message, 0);
                }
            }
            Op::Within => {
                if let Ok(child) = message.within(3) {
                    message = child;
                    cursor = Cursor::raw(&message, 0);
                }
            }
            Op::MessagePut(tag, raw) => {
                let tag = u32::from(tag % 7);
                let _ = message.put(tag, &value_for(tag, raw));
            }
            Op::EraseTag(tag) => {
                let _ = message.erase_tag(u32::from(tag % 7));
            }
        }
    }

    if valid_before {
        let fresh = Journal::new(journal.to_vec());
        assert!(well_formed(&Message::new(&fresh, &NODE)));
    }
}

fuzz_target!(|input: Input| run(input));
