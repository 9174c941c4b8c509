//! Cursor: iterates the occurrences of one tag (or of every field) inside a
//! message, and is the entry point for reading, writing and erasing values
//! in place.
//!
//! States
//! - A cursor is valid while no error is recorded. `EndOfMessage` marks an
//!   exhausted scan (or an inactive `oneof` member); any other error is a
//!   fault. Both are terminal until [`Cursor::rewind`] or re-creation.
//! - While positioned inside a packed blob the cursor is in
//!   [`Context::Packed`], holding the blob's range, and steps element-wise
//!   through it before resuming the tag scan behind the blob.
//! - After [`Cursor::erase`] the cursor is valid but not positioned on any
//!   occurrence: reads and writes fail with [`Error::Invalid`] until the
//!   next successful [`Cursor::next`].
//!
//! Resolution
//! - [`Cursor::new`] applies the merge rules: a non-repeated field resolves
//!   to its last occurrence on the wire, and a `oneof` member resolves to
//!   `EndOfMessage` if a later member of its group was written.
//!   [`Cursor::raw`] stops at the first occurrence instead.
//!
//! Every operation that reads the current position first realigns the
//! packed blob, then the message, then the current offset, so views created
//! before an edit see the shifted bytes.

use tracing::debug;

use crate::{
    descriptor::{FieldDescriptor, Label},
    error::{Error, Result},
    field::Field,
    journal::{Diff, Journal, Offset, Version},
    message::Message,
    part::Part,
    stream::Stream,
    value::Value,
    wire::{Tag, WireType},
};

/// Where the cursor currently iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Scanning tagged fields of the message.
    Field,
    /// Stepping through the elements of a packed blob.
    Packed {
        /// Value range of the whole blob.
        blob: Offset,
    },
}

/// Iterator over the occurrences of a tag inside a [`Message`].
///
/// The cursor owns a copy of its message view; cloning a cursor clones that
/// view, sharing the journal.
#[derive(Debug, Clone)]
pub struct Cursor {
    message: Message,
    tag: Tag,
    descriptor: Option<&'static FieldDescriptor>,
    offset: Offset,
    context: Context,
    pos: Option<usize>,
    version: Version,
    error: Option<Error>,
    resolved: bool,
    erased: bool,
}

impl Cursor {
    /// Cursor on the authoritative occurrence of `tag`.
    ///
    /// For optional and required fields this is the last occurrence on the
    /// wire. For a `oneof` member the cursor is invalid with
    /// [`Error::EndOfMessage`] if another member of the group appears later.
    /// Repeated fields start at their first occurrence.
    ///
    /// Always check [`is_valid`](Self::is_valid) before use.
    #[must_use]
    pub fn new(message: &Message, tag: Tag) -> Self {
        let mut cursor = Self::raw(message, tag);
        cursor.resolved = true;
        let Some(field) = cursor.descriptor else {
            return cursor;
        };
        if !cursor.is_valid() || field.label() == Label::Repeated {
            return cursor;
        }

        let mut scan = cursor.clone();
        while scan.next() {
            cursor.clone_from(&scan);
        }
        if let Some(err) = scan.error.filter(|&err| err != Error::EndOfMessage) {
            cursor.invalidate(err);
            return cursor;
        }

        if let Some(group) = field.oneof() {
            let mut scan = cursor.clone();
            scan.tag = 0;
            while scan.next() {
                if scan.descriptor.and_then(FieldDescriptor::oneof) == Some(group) {
                    cursor.invalidate(Error::EndOfMessage);
                    break;
                }
            }
        }
        cursor
    }

    /// Cursor on the first occurrence of `tag`, or on the first field of any
    /// tag if `tag` is zero, without merge or `oneof` resolution.
    #[must_use]
    pub fn raw(message: &Message, tag: Tag) -> Self {
        let mut message = message.clone();
        let aligned = message.align();
        let start = message.offset().start;
        let descriptor = match tag {
            0 => None,
            tag => message.descriptor().field_by_tag(tag),
        };
        let version = message.version();
        let mut cursor = Self {
            message,
            tag,
            descriptor,
            offset: Offset::new(start, start),
            context: Context::Field,
            pos: None,
            version,
            error: None,
            resolved: false,
            erased: false,
        };
        if let Err(err) = aligned {
            cursor.invalidate(err);
        } else if tag != 0 && descriptor.is_none() {
            cursor.invalidate(Error::Invalid);
        } else {
            cursor.next();
        }
        cursor
    }

    /// Cursor on the authoritative occurrence of the last tag of `tags`,
    /// inside the submessage reached by the preceding tags.
    #[must_use]
    pub fn nested(message: &Message, tags: &[Tag]) -> Self {
        let Some((&last, path)) = tags.split_last() else {
            let mut cursor = Self::raw(message, 0);
            cursor.invalidate(Error::Invalid);
            return cursor;
        };
        match message.create_nested(path) {
            Ok(submessage) => Self::new(&submessage, last),
            Err(err) => {
                let mut cursor = Self::raw(message, 0);
                cursor.invalidate(err);
                cursor
            }
        }
    }

    /// Whether no error has been recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Error that invalidated the cursor, if any.
    #[must_use]
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Tag the cursor filters on; zero matches every field.
    #[must_use]
    pub fn filter(&self) -> Tag {
        self.tag
    }

    /// Tag of the current field, or zero before the first hit.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.descriptor.map_or(0, |field| field.tag)
    }

    /// Descriptor of the current field.
    #[must_use]
    pub fn descriptor(&self) -> Option<&'static FieldDescriptor> {
        self.descriptor
    }

    /// Zero-based index of the current hit among all hits so far.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos.unwrap_or(0)
    }

    /// Offset of the current value, as of [`version`](Self::version).
    #[must_use]
    pub fn current(&self) -> Offset {
        self.offset
    }

    /// Iteration context.
    #[must_use]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Whether the current occurrence was erased and `next` has not moved
    /// on yet.
    #[must_use]
    pub fn is_erased(&self) -> bool {
        self.erased
    }

    /// Version the cached offsets are valid at.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The cursor's own message view.
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Journal the cursor reads from.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        self.message.journal()
    }

    /// Move to the next occurrence.
    ///
    /// Returns `false` once the message is exhausted (the cursor then holds
    /// [`Error::EndOfMessage`]) or on a decode fault.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.align().is_err() {
            return false;
        }
        loop {
            let step = match self.context {
                Context::Packed { blob } => self.next_packed(blob),
                Context::Field => self.next_field(),
            };
            match step {
                Ok(true) => {
                    self.pos = Some(self.pos.map_or(0, |pos| pos + 1));
                    self.erased = false;
                    return true;
                }
                Ok(false) => {}
                Err(err) => {
                    self.invalidate(err);
                    return false;
                }
            }
        }
    }

    /// Restart at the first occurrence of the filter tag.
    ///
    /// Works on exhausted cursors too; returns whether an occurrence exists.
    pub fn rewind(&mut self) -> bool {
        *self = Self::raw(&self.message, self.tag);
        self.is_valid()
    }

    /// Advance until the current value equals `value`.
    ///
    /// The current position itself is not compared. Only meaningful for
    /// tagged cursors over scalar fields; returns `false` otherwise.
    pub fn seek(&mut self, value: &Value) -> bool {
        if !self.is_valid() || self.tag == 0 {
            return false;
        }
        if self.descriptor.is_none_or(FieldDescriptor::is_message) {
            return false;
        }
        while self.next() {
            if self.matches(value) {
                return true;
            }
        }
        false
    }

    /// Whether the current value equals `value`.
    pub fn matches(&mut self, value: &Value) -> bool {
        Field::from_cursor(self).is_ok_and(|field| field.matches(value))
    }

    /// Decode the current value.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid cursor or a message-typed field,
    /// decode errors otherwise.
    pub fn get(&mut self) -> Result<Value> {
        Field::from_cursor(self)?.get()
    }

    /// Overwrite the current scalar value.
    ///
    /// A new encoding of different length shifts every following byte; all
    /// enclosing length prefixes are rewritten.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid cursor, a message-typed field or a
    /// value that does not fit the field's type.
    pub fn put(&mut self, value: &Value) -> Result<()> {
        Field::from_cursor(self)?.put(value)
    }

    /// Replace the current submessage with the encoded bytes of `message`.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid cursor, a scalar field, an invalid
    /// source, or a source living in this cursor's journal.
    pub fn put_message(&mut self, message: &Message) -> Result<()> {
        self.align()?;
        if self.erased || !self.descriptor.is_some_and(FieldDescriptor::is_message) {
            return Err(Error::Invalid);
        }
        if self.journal().ptr_eq(message.journal()) {
            return Err(Error::Invalid);
        }
        let mut source = message.clone();
        source.align()?;
        let range = source.offset();
        let bytes = source.journal().data_from(range.start);
        Part::from_cursor(self)?.write(&bytes[..range.len()])
    }

    /// Remove the current occurrence from the message.
    ///
    /// Exactly one occurrence is removed. Afterwards [`next`](Self::next)
    /// continues with the field that followed it; on a resolved cursor over a
    /// non-repeated field it lands on the occurrence that became
    /// authoritative instead, if any. Until then the cursor is
    /// [erased](Self::is_erased).
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid or already erased cursor.
    pub fn erase(&mut self) -> Result<()> {
        self.align()?;
        let field = self.descriptor.ok_or(Error::Invalid)?;
        let erased = self.offset;
        let packed = matches!(self.context, Context::Packed { .. });
        if field.is_message() {
            Message::from_cursor(self)?.erase()?;
        } else {
            Field::from_cursor(self)?.clear()?;
        }

        // the cached version stays pre-erase, so the next alignment moves
        // this empty marker along with the removal
        let at = if packed {
            erased.start
        } else {
            erased.prefix_start()
        };
        self.offset = marker(at, erased.origin());
        self.pos = self.pos.and_then(|pos| pos.checked_sub(1));
        self.erased = true;

        if self.resolved && !packed && field.label() != Label::Repeated {
            self.align()?;
            let resolved = Self::new(&self.message, self.tag);
            if resolved.is_valid() {
                let at = match resolved.context {
                    Context::Packed { .. } => resolved.offset.start,
                    Context::Field => resolved.offset.prefix_start(),
                };
                self.offset = marker(at, self.message.offset().start);
                self.context = resolved.context;
                self.descriptor = resolved.descriptor;
                self.pos = resolved.pos.and_then(|pos| pos.checked_sub(1));
            }
        }
        Ok(())
    }

    /// Move from a packed element out to the blob holding it, so that the
    /// whole blob is the current occurrence.
    pub(crate) fn leave_packed(&mut self) {
        if let Context::Packed { blob } = self.context {
            self.offset = blob;
            self.context = Context::Field;
        }
    }

    /// Replay edits made since the cached version: packed blob first, then
    /// the message, then the current offset.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid cursor, or if the current field was
    /// removed by another view; the cursor becomes invalid.
    pub fn align(&mut self) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::Invalid);
        }
        let journal = self.journal().clone();
        if self.version == journal.version() {
            return Ok(());
        }
        let mut context = self.context;
        if let Context::Packed { blob } = &mut context {
            let mut version = self.version;
            if let Err(err) = journal.align(&mut version, blob) {
                return Err(self.invalidate(err));
            }
        }
        if let Err(err) = self.message.align() {
            return Err(self.invalidate(err));
        }
        let mut version = self.version;
        if let Err(err) = journal.align(&mut version, &mut self.offset) {
            return Err(self.invalidate(err));
        }
        self.context = context;
        self.version = version;
        Ok(())
    }

    /// Enclosing ranges of the current value, innermost first, optionally
    /// starting with the value itself.
    pub(crate) fn enclosing(&self, with_current: bool) -> impl Iterator<Item = Offset> + '_ {
        let current = with_current.then_some(self.offset);
        let blob = match self.context {
            Context::Packed { blob } => Some(blob),
            Context::Field => None,
        };
        current
            .into_iter()
            .chain(blob)
            .chain(self.message.frames().iter().rev().copied())
    }

    fn invalidate(&mut self, err: Error) -> Error {
        if err != Error::EndOfMessage {
            debug!(%err, tag = self.tag, "cursor invalidated");
            #[cfg(any(test, feature = "fuzzing"))]
            if self.journal().options().panic_on_error {
                panic!("cursor invalidated: {err}");
            }
        }
        self.error = Some(err);
        err
    }

    fn next_packed(&mut self, blob: Offset) -> Result<bool> {
        let field = self.descriptor.ok_or(Error::Invalid)?;
        let start = self.offset.end;
        if start >= blob.end {
            self.offset = blob;
            self.context = Context::Field;
            return Ok(false);
        }
        let len = {
            let data = self.journal().data_from(start);
            let mut stream = Stream::new(&data[..blob.end - start]);
            stream.skip(field.wire_type())?;
            stream.offset()
        };
        self.offset = marker(start, self.message.offset().start);
        self.offset.end = start + len;
        Ok(true)
    }

    fn next_field(&mut self) -> Result<bool> {
        let journal = self.journal().clone();
        let origin = self.message.offset();
        let data = journal.data_from(0);
        let mut stream = Stream::at(&data[..origin.end], self.offset.end);
        while stream.left() > 0 {
            let tag_at = stream.offset();
            let key = stream.read_varint32()?;
            #[expect(clippy::cast_possible_truncation)]
            let wire_type = WireType::from_bits(key as u8)?;
            let tag = key >> 3;

            let length_at = stream.offset();
            let start = if wire_type == WireType::Length {
                let len = stream.read_varint32()? as usize;
                let start = stream.offset();
                stream.advance(len)?;
                start
            } else {
                let start = stream.offset();
                stream.skip(wire_type)?;
                start
            };
            self.offset = Offset {
                start,
                end: stream.offset(),
                diff: Diff {
                    origin: relative(origin.start, start),
                    tag: relative(tag_at, start),
                    length: relative(length_at, start),
                },
            };

            if self.tag != 0 && self.tag != tag {
                continue;
            }
            let field = match self.descriptor {
                Some(field) if field.tag == tag => field,
                _ => match self.message.descriptor().field_by_tag(tag) {
                    Some(field) => {
                        self.descriptor = Some(field);
                        field
                    }
                    None => continue,
                },
            };

            if wire_type != field.wire_type() {
                if wire_type != WireType::Length {
                    continue;
                }
                self.context = Context::Packed { blob: self.offset };
                self.offset = marker(start, origin.start);
                return Ok(false);
            }
            return Ok(true);
        }
        Err(Error::EndOfMessage)
    }
}

/// Empty, prefix-less range at `at` inside the message starting at `origin`.
fn marker(at: usize, origin: usize) -> Offset {
    Offset {
        start: at,
        end: at,
        diff: Diff {
            origin: relative(origin, at),
            tag: 0,
            length: 0,
        },
    }
}

#[expect(clippy::cast_possible_wrap)]
fn relative(at: usize, base: usize) -> isize {
    at as isize - base as isize
}
