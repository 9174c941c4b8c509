#![expect(missing_docs)]

mod common;

use protoview::{Cursor, Journal, Message, Value};

use crate::common::{ALICE, PERSON, PHONE, hex};

fn render(value: &Value) -> String {
    match value {
        Value::I32(v) => v.to_string(),
        Value::String(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

#[test]
fn snapshot_rename_nested_phone() {
    let journal = Journal::new(ALICE.to_vec());
    let person = Message::new(&journal, &PERSON);
    let mut id = Cursor::new(&person, 2);

    let mut number = Cursor::nested(&person, &[4, 1]);
    number.put(&Value::from("555-1234")).unwrap();

    insta::assert_snapshot!(
        hex(&journal.to_vec()),
        @"0a 05 41 6c 69 63 65 10 7b 22 0c 0a 08 35 35 35 2d 31 32 33 34 10 02"
    );
    assert_eq!(id.get(), Ok(Value::I32(123)));
}

#[test]
fn snapshot_put_then_erase() {
    let journal = Journal::new(ALICE.to_vec());
    let mut person = Message::new(&journal, &PERSON);
    person.put(3, &Value::from("a@b")).unwrap();
    person.erase_tag(1).unwrap();

    insta::assert_snapshot!(
        hex(&journal.to_vec()),
        @"10 7b 22 07 0a 03 35 35 35 10 02 1a 03 61 40 62"
    );
    assert_eq!(person.get(3), Ok(Value::from("a@b")));
    assert!(!person.has(1));
}

#[test]
fn snapshot_phone_types_with_defaults() {
    let scratch = Journal::new(Vec::new());
    let mut phone = Message::new(&scratch, &PHONE);
    phone.put(1, &Value::from("777")).unwrap();

    let journal = Journal::new(ALICE.to_vec());
    let mut person = Message::new(&journal, &PERSON);
    person.put_message(4, &phone).unwrap();

    let mut rendered = Vec::new();
    let mut cursor = Cursor::new(&person, 4);
    while cursor.is_valid() {
        let phone = Message::from_cursor(&mut cursor).unwrap();
        let number = phone.get(1).unwrap();
        let kind = phone.get(2).unwrap();
        rendered.push(format!("{}:{}", render(&number), render(&kind)));
        cursor.next();
    }

    insta::assert_snapshot!(rendered.join(" "), @"555:2 777:1");
    insta::assert_snapshot!(
        hex(&journal.to_vec()[ALICE.len()..]),
        @"22 05 0a 03 37 37 37"
    );
}

#[test]
fn snapshot_packed_and_appended_values() {
    let mut bytes = ALICE.to_vec();
    bytes.extend_from_slice(&[0x2a, 0x02, 0x03, 0x07]);
    let journal = Journal::new(bytes);
    let mut person = Message::new(&journal, &PERSON);
    person.put(5, &Value::I32(9)).unwrap();

    let mut lucky = Vec::new();
    let mut cursor = Cursor::new(&person, 5);
    while cursor.is_valid() {
        lucky.push(render(&cursor.get().unwrap()));
        cursor.next();
    }

    insta::assert_snapshot!(lucky.join(" "), @"3 7 9");
    insta::assert_snapshot!(
        hex(&journal.to_vec()[ALICE.len()..]),
        @"2a 02 03 07 2a 01 09"
    );
}
