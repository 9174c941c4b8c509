use alloc::{vec, vec::Vec};

use super::schema::{INNER, LEAF, OUTER, concat, delimited, packed, varint};
use crate::{Cursor, Error, Journal, Message, Value};

#[test]
fn get_falls_back_to_default() {
    let journal = Journal::new(vec![]);
    let message = Message::new(&journal, &OUTER);
    assert_eq!(message.get(1), Ok(Value::I32(7)));
    assert_eq!(message.get(2), Err(Error::Absent));
    assert_eq!(message.get(3), Err(Error::Invalid));
    assert_eq!(message.get(8), Err(Error::Invalid));
}

#[test]
fn has_reports_active_occurrences() {
    let journal = Journal::new(concat(&[&varint(1, 1), &varint(6, 2), &delimited(7, b"x")]));
    let message = Message::new(&journal, &OUTER);
    assert!(message.has(1));
    assert!(!message.has(2));
    assert!(!message.has(6));
    assert!(message.has(7));
}

#[test]
fn put_overwrites_or_appends() {
    let journal = Journal::new(varint(1, 1));
    let mut message = Message::new(&journal, &OUTER);
    message.put(1, &Value::I32(2)).unwrap();
    message.put(2, &Value::from("hi")).unwrap();
    assert_eq!(journal.to_vec(), [0x08, 0x02, 0x12, 0x02, b'h', b'i']);
    assert_eq!(message.size(), Ok(6));
}

#[test]
fn put_repeated_appends_occurrence() {
    let journal = Journal::new(delimited(5, b"a"));
    let mut message = Message::new(&journal, &OUTER);
    message.put(5, &Value::from("b")).unwrap();
    assert_eq!(journal.to_vec(), [0x2a, 0x01, b'a', 0x2a, 0x01, b'b']);
}

#[test]
fn put_oneof_member_clears_group() {
    let journal = Journal::new(concat(&[&varint(1, 1), &varint(6, 2)]));
    let mut message = Message::new(&journal, &OUTER);
    message.put(7, &Value::from("x")).unwrap();
    assert_eq!(journal.to_vec(), [0x08, 0x01, 0x3a, 0x01, b'x']);
    assert!(!message.has(6));
}

#[test]
fn within_creates_missing_submessage() {
    let journal = Journal::new(vec![]);
    let mut message = Message::new(&journal, &OUTER);
    let mut child = message.within(3).unwrap();
    assert_eq!(journal.to_vec(), [0x1a, 0x00]);
    assert_eq!(child.depth(), 1);

    child.put(1, &Value::I32(5)).unwrap();
    assert_eq!(journal.to_vec(), [0x1a, 0x02, 0x08, 0x05]);

    let mut leaf = child.within(3).unwrap();
    leaf.put(1, &Value::from(&b"\x00"[..])).unwrap();
    assert_eq!(
        journal.to_vec(),
        [0x1a, 0x07, 0x08, 0x05, 0x1a, 0x03, 0x0a, 0x01, 0x00]
    );
    assert_eq!(message.size(), Ok(9));
    assert_eq!(leaf.descriptor().name, LEAF.name);
}

#[test]
fn within_reuses_existing_submessage() {
    let journal = Journal::new(delimited(3, &varint(1, 4)));
    let mut message = Message::new(&journal, &OUTER);
    let child = message.within(3).unwrap();
    assert_eq!(child.get(1), Ok(Value::I32(4)));
    assert_eq!(journal.version(), 0);
}

#[test]
fn put_message_appends_copy() {
    let source_journal = Journal::new(varint(1, 9));
    let source = Message::new(&source_journal, &INNER);
    let journal = Journal::new(varint(1, 1));
    let mut message = Message::new(&journal, &OUTER);

    message.put_message(11, &source).unwrap();
    message.put_message(11, &source).unwrap();
    assert_eq!(
        journal.to_vec(),
        [0x08, 0x01, 0x5a, 0x02, 0x08, 0x09, 0x5a, 0x02, 0x08, 0x09]
    );
    assert_eq!(message.put_message(1, &source), Err(Error::Invalid));
}

#[test]
fn erase_tag_removes_every_occurrence() {
    let journal = Journal::new(concat(&[
        &delimited(5, b"a"),
        &varint(1, 1),
        &delimited(5, b"b"),
    ]));
    let mut message = Message::new(&journal, &OUTER);
    message.erase_tag(5).unwrap();
    assert_eq!(journal.to_vec(), [0x08, 0x01]);
    assert!(!message.has(5));
}

#[test]
fn erase_tag_removes_packed_blobs_whole() {
    let journal = Journal::new(concat(&[
        &packed(4, &[1, 2]),
        &varint(1, 5),
        &varint(4, 3),
        &packed(4, &[7]),
    ]));
    let mut message = Message::new(&journal, &OUTER);
    message.erase_tag(4).unwrap();
    assert_eq!(journal.to_vec(), [0x08, 0x05]);
    assert!(!message.has(4));
    assert_eq!(message.get(1), Ok(Value::I32(5)));
}

#[test]
fn put_packed_appends_one_element_blob() {
    let journal = Journal::new(varint(1, 1));
    let mut message = Message::new(&journal, &OUTER);
    message.put(4, &Value::U32(9)).unwrap();
    message.put(4, &Value::U32(300)).unwrap();
    assert_eq!(
        journal.to_vec(),
        [0x08, 0x01, 0x22, 0x01, 0x09, 0x22, 0x02, 0xac, 0x02]
    );

    let mut cursor = Cursor::new(&message, 4);
    let mut found = Vec::new();
    while cursor.is_valid() {
        found.push(cursor.get().unwrap());
        cursor.next();
    }
    assert_eq!(found, [Value::U32(9), Value::U32(300)]);
}

#[test]
fn erase_nested_message_removes_field() {
    let journal = Journal::new(concat(&[&varint(1, 1), &delimited(3, &varint(1, 2))]));
    let message = Message::new(&journal, &OUTER);
    let mut child = message.create_nested(&[3]).unwrap();
    child.erase().unwrap();
    assert_eq!(journal.to_vec(), [0x08, 0x01]);
    assert!(!child.valid());
    assert_eq!(child.erase(), Err(Error::Invalid));
}

#[test]
fn erase_root_empties_journal() {
    let journal = Journal::new(concat(&[&varint(1, 1), &delimited(2, b"a")]));
    let mut message = Message::new(&journal, &OUTER);
    message.erase().unwrap();
    assert!(journal.is_empty());
    assert!(message.valid());
    assert_eq!(message.size(), Ok(0));
}

#[test]
fn create_nested_requires_message_path() {
    let journal = Journal::new(concat(&[&varint(1, 1), &delimited(3, &[])]));
    let message = Message::new(&journal, &OUTER);
    assert_eq!(message.create_nested(&[1]).err(), Some(Error::Invalid));
    assert_eq!(message.create_nested(&[3, 3]).err(), Some(Error::Invalid));
    let mut child = message.create_nested(&[3]).unwrap();
    assert_eq!(child.size(), Ok(0));
    assert!(child.valid());
}

#[test]
fn from_cursor_walks_repeated_submessages() {
    let journal = Journal::new(concat(&[
        &delimited(11, &varint(1, 1)),
        &delimited(11, &varint(1, 2)),
    ]));
    let message = Message::new(&journal, &OUTER);
    let mut cursor = Cursor::new(&message, 11);
    let mut values = Vec::new();
    while cursor.is_valid() {
        let child = Message::from_cursor(&mut cursor).unwrap();
        values.push(child.get(1).unwrap());
        cursor.next();
    }
    assert_eq!(values, [Value::I32(1), Value::I32(2)]);
}

#[test]
fn range_beyond_journal_is_invalid() {
    let journal = Journal::new(vec![0x08, 0x01]);
    let mut message = Message::create(&journal, 0, 4, &OUTER);
    assert!(!message.valid());
    assert_eq!(message.to_vec(), Err(Error::Invalid));
}

#[test]
fn to_vec_copies_value() {
    let journal = Journal::new(delimited(3, &varint(1, 3)));
    let message = Message::new(&journal, &OUTER);
    let mut child = message.create_nested(&[3]).unwrap();
    assert_eq!(child.to_vec(), Ok(vec![0x08, 0x03]));
    assert_eq!(child.start(), Ok(2));
    assert_eq!(child.end(), Ok(4));
}
