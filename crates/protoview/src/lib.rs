//! Read and mutate Protocol Buffers messages in place.
//!
//! All messages of one tree live in a single byte buffer owned by a
//! [`Journal`]. [`Message`], [`Cursor`], [`Field`] and [`Part`] are views
//! into it: they hold offsets, not copies. Writes splice the buffer and
//! rewrite every enclosing length prefix; views created earlier realign
//! lazily by replaying the journal's edit log the next time they are used.
//!
//! ```
//! use protoview::{Cursor, Descriptor, FieldDescriptor, Journal, Label, Message, Type, Value};
//!
//! static POINT_FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::new(1, "x", Type::SInt32, Label::Optional),
//!     FieldDescriptor::new(2, "y", Type::SInt32, Label::Optional),
//! ];
//! static POINT: Descriptor = Descriptor::new("Point", &POINT_FIELDS);
//!
//! // x = 1, y = -1
//! let journal = Journal::new(vec![0x08, 0x02, 0x10, 0x01]);
//! let message = Message::new(&journal, &POINT);
//!
//! let mut cursor = Cursor::new(&message, 2);
//! assert_eq!(cursor.get(), Ok(Value::I32(-1)));
//! cursor.put(&Value::I32(-300)).unwrap();
//!
//! assert_eq!(journal.to_vec(), [0x08, 0x02, 0x10, 0xd7, 0x04]);
//! assert_eq!(message.get(1), Ok(Value::I32(1)));
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod cursor;
mod descriptor;
mod error;
mod field;
mod journal;
mod message;
mod options;
mod part;
mod stream;
mod value;
pub mod wire;

#[cfg(test)]
mod tests;

pub use buffer::Buffer;
pub use cursor::{Context, Cursor};
pub use descriptor::{DefaultValue, Descriptor, FieldDescriptor, Label, Type};
pub use error::{Error, Result};
pub use field::Field;
pub use journal::{Diff, Edit, Journal, Offset, Version};
pub use message::Message;
pub use options::JournalOptions;
pub use part::Part;
pub use stream::Stream;
pub use value::Value;
pub use wire::{Tag, WireType};
