use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use super::schema::{OUTER, concat, delimited, packed, varint};
use crate::{Cursor, Journal, Message, Value, wire};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: erasing any subset of a packed blob's elements leaves exactly
/// the others, and the field behind the blob stays readable through a cursor
/// created before the first erase.
#[test]
fn packed_erase_keeps_the_rest_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(values: Vec<u32>, keep: Vec<bool>, trailing: u16) -> bool {
        let raw: Vec<u64> = values.iter().map(|&v| u64::from(v)).collect();
        let journal = Journal::new(concat(&[&packed(4, &raw), &varint(1, u64::from(trailing))]));
        let message = Message::new(&journal, &OUTER);
        let mut id = Cursor::new(&message, 1);

        let mut cursor = Cursor::new(&message, 4);
        let mut index = 0;
        while cursor.is_valid() {
            if !keep.get(index).copied().unwrap_or(true) && cursor.erase().is_err() {
                return false;
            }
            cursor.next();
            index += 1;
        }

        let expected: Vec<Value> = values
            .iter()
            .zip(keep.iter().copied().chain(core::iter::repeat(true)))
            .filter(|&(_, keep)| keep)
            .map(|(&v, _)| Value::U32(v))
            .collect();

        let fresh = Message::new(&Journal::new(journal.to_vec()), &OUTER);
        let mut reread = Cursor::new(&fresh, 4);
        let mut found = Vec::new();
        while reread.is_valid() {
            match reread.get() {
                Ok(value) => found.push(value),
                Err(_) => return false,
            }
            reread.next();
        }

        found == expected && id.get() == Ok(Value::I32(i32::from(trailing)))
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<u32>, Vec<bool>, u16) -> bool);
}

/// Property: rewriting a string two levels deep any number of times keeps
/// every length prefix equal to the size of what it encloses.
#[test]
fn nested_rewrites_keep_prefixes_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(labels: Vec<String>, id: u16) -> bool {
        let inner = delimited(2, b"");
        let journal = Journal::new(concat(&[&delimited(3, &inner), &varint(1, u64::from(id))]));
        let message = Message::new(&journal, &OUTER);
        let mut stale = Cursor::new(&message, 1);

        for label in &labels {
            let mut cursor = Cursor::nested(&message, &[3, 2]);
            if cursor.put(&Value::from(label.as_str())).is_err() {
                return false;
            }
        }

        let last = labels.last().cloned().unwrap_or_default();
        let fresh = Message::new(&Journal::new(journal.to_vec()), &OUTER);
        let Ok(mut child) = fresh.create_nested(&[3]) else {
            return false;
        };
        let expected_size = 1 + wire::varint_len(last.len() as u64) + last.len();

        child.size() == Ok(expected_size)
            && child.get(2) == Ok(Value::String(last))
            && fresh.get(1) == Ok(Value::I32(i32::from(id)))
            && stale.get() == Ok(Value::I32(i32::from(id)))
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<String>, u16) -> bool);
}
