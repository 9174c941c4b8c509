//! Message views: a validated byte range of a journal plus its descriptor.
//!
//! A message keeps the offsets of every length-delimited range that encloses
//! it, outermost first and itself last. Writes use this chain to keep all
//! enclosing length prefixes consistent, and alignment replays edits against
//! the whole chain at once.

use alloc::vec::Vec;

use tracing::debug;

use crate::{
    cursor::Cursor,
    descriptor::{DefaultValue, Descriptor, Label},
    error::{Error, Result},
    journal::{Journal, Offset, Version},
    value::Value,
    wire::{self, MAX_VARINT_LEN, Tag, WireType},
};

/// View of one message inside a [`Journal`].
#[derive(Debug, Clone)]
pub struct Message {
    journal: Journal,
    descriptor: &'static Descriptor,
    /// Enclosing ranges, outermost first; the last one is this message.
    frames: Vec<Offset>,
    version: Version,
    erased: bool,
}

impl Message {
    /// Message spanning the whole journal.
    #[must_use]
    pub fn new(journal: &Journal, descriptor: &'static Descriptor) -> Self {
        let end = journal.len();
        Self::create(journal, 0, end, descriptor)
    }

    /// Message over `[start, end)` of `journal`.
    ///
    /// The range is not checked here; see [`valid`](Self::valid).
    #[must_use]
    pub fn create(
        journal: &Journal,
        start: usize,
        end: usize,
        descriptor: &'static Descriptor,
    ) -> Self {
        let mut frames = Vec::with_capacity(1);
        frames.push(Offset::new(start, end));
        Self {
            journal: journal.clone(),
            descriptor,
            frames,
            version: journal.version(),
            erased: start > end,
        }
    }

    /// Submessage at the cursor's current occurrence.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the cursor is invalid, erased or not positioned
    /// on a message-typed field.
    pub fn from_cursor(cursor: &mut Cursor) -> Result<Self> {
        cursor.align()?;
        if cursor.is_erased() {
            return Err(Error::Invalid);
        }
        let field = cursor.descriptor().ok_or(Error::Invalid)?;
        let nested = field.nested.ok_or(Error::Invalid)?;
        if !field.is_message() {
            return Err(Error::Invalid);
        }
        let parent = cursor.message();
        let mut frames = Vec::with_capacity(parent.frames.len() + 1);
        frames.extend_from_slice(&parent.frames);
        frames.push(cursor.current());
        Ok(Self {
            journal: parent.journal.clone(),
            descriptor: nested,
            frames,
            version: parent.version,
            erased: false,
        })
    }

    /// Descend through `tags`, each naming the authoritative (last)
    /// occurrence of a submessage field of the current message.
    ///
    /// An empty path yields a copy of `self`.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if an intermediate tag is absent or not
    /// message-typed, or this message is invalid.
    pub fn create_nested(&self, tags: &[Tag]) -> Result<Self> {
        let mut message = self.clone();
        message.align()?;
        for &tag in tags {
            let mut cursor = Cursor::new(&message, tag);
            if !cursor.is_valid() {
                return Err(Error::Invalid);
            }
            message = Self::from_cursor(&mut cursor)?;
        }
        Ok(message)
    }

    /// Journal the message lives in.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Descriptor of the message.
    #[must_use]
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Version the cached offsets are valid at.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the message is aligned with the journal's current version.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.version == self.journal.version()
    }

    /// Nesting depth; zero for a top-level message.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Cached offset of the message's value, as of [`version`](Self::version).
    #[must_use]
    pub fn offset(&self) -> Offset {
        self.frames[self.frames.len() - 1]
    }

    pub(crate) fn frames(&self) -> &[Offset] {
        &self.frames
    }

    /// Whether the message still exists and lies inside the journal.
    ///
    /// An empty range counts as valid: a message with no fields yet (a fresh
    /// root, or a submessage appended by [`within`](Self::within)) is the
    /// starting point for appending writes. Only removal by an edit, or a
    /// range past the journal's end, makes a message invalid.
    pub fn valid(&mut self) -> bool {
        self.align().is_ok()
    }

    /// Re-derive the message's range (and those of its ancestors) from the
    /// edits made since the cached version.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the message or an ancestor was removed; the
    /// message stays invalid from then on.
    pub fn align(&mut self) -> Result<()> {
        if self.erased {
            return Err(Error::Invalid);
        }
        let current = self.journal.version();
        if self.version != current {
            for frame in &mut self.frames {
                let mut version = self.version;
                if let Err(err) = self.journal.align(&mut version, frame) {
                    debug!(message = self.descriptor.name, "message removed by edit");
                    self.erased = true;
                    return Err(err);
                }
            }
            self.version = current;
        }
        if self.offset().end > self.journal.len() {
            return Err(Error::Invalid);
        }
        Ok(())
    }

    /// Aligned start of the message's value.
    ///
    /// # Errors
    ///
    /// As [`align`](Self::align).
    pub fn start(&mut self) -> Result<usize> {
        self.align()?;
        Ok(self.offset().start)
    }

    /// Aligned end of the message's value.
    ///
    /// # Errors
    ///
    /// As [`align`](Self::align).
    pub fn end(&mut self) -> Result<usize> {
        self.align()?;
        Ok(self.offset().end)
    }

    /// Aligned size of the message's value.
    ///
    /// # Errors
    ///
    /// As [`align`](Self::align).
    pub fn size(&mut self) -> Result<usize> {
        self.align()?;
        Ok(self.offset().len())
    }

    /// Copy of the message's encoded value.
    ///
    /// # Errors
    ///
    /// As [`align`](Self::align).
    pub fn to_vec(&mut self) -> Result<Vec<u8>> {
        self.align()?;
        let offset = self.offset();
        Ok(self.journal.data_from(offset.start)[..offset.len()].to_vec())
    }

    /// Remove the message from the journal.
    ///
    /// A submessage loses its whole field (tag, length and value) and the
    /// view becomes invalid. A top-level message is emptied and stays valid.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the message is already invalid.
    pub fn erase(&mut self) -> Result<()> {
        self.align()?;
        let offset = self.offset();
        let (outer, _) = self.frames.split_at(self.frames.len() - 1);
        let range = if self.depth() == 0 {
            offset.start..offset.end
        } else {
            offset.field_range()
        };
        self.journal.splice(
            self.version,
            offset.start,
            range,
            &[],
            outer.iter().rev().copied(),
        )?;
        if self.depth() == 0 {
            self.align()
        } else {
            self.erased = true;
            Ok(())
        }
    }

    /// Whether at least one active occurrence of `tag` exists.
    pub fn has(&self, tag: Tag) -> bool {
        Cursor::new(self, tag).is_valid()
    }

    /// Value of the authoritative occurrence of `tag`, or its schema default.
    ///
    /// # Errors
    ///
    /// [`Error::Absent`] if there is neither, [`Error::Invalid`] for an
    /// unknown or message-typed tag, decode errors otherwise.
    pub fn get(&self, tag: Tag) -> Result<Value> {
        let field = self.descriptor.field_by_tag(tag).ok_or(Error::Invalid)?;
        if field.is_message() {
            return Err(Error::Invalid);
        }
        let mut cursor = Cursor::new(self, tag);
        match cursor.error() {
            None => cursor.get(),
            Some(Error::EndOfMessage) => field
                .default
                .map(DefaultValue::to_value)
                .ok_or(Error::Absent),
            Some(err) => Err(err),
        }
    }

    /// Write `value` to `tag`.
    ///
    /// Overwrites the authoritative occurrence if there is one, otherwise
    /// appends a new field at the end of the message. Putting a `oneof`
    /// member first removes the other members of its group. Repeated fields
    /// always receive a new occurrence; for a packed field that is a
    /// length-delimited blob holding the one element.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] for an unknown or message-typed tag, a value that
    /// does not fit the field's type, or an invalid message.
    pub fn put(&mut self, tag: Tag, value: &Value) -> Result<()> {
        let field = self.descriptor.field_by_tag(tag).ok_or(Error::Invalid)?;
        if field.is_message() {
            return Err(Error::Invalid);
        }
        self.clear_oneof(tag)?;
        if field.label() != Label::Repeated {
            let mut cursor = Cursor::new(self, tag);
            match cursor.error() {
                None => return cursor.put(value),
                Some(Error::EndOfMessage) => {}
                Some(err) => return Err(err),
            }
        }
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let payload = value.encode(field.ty, &mut scratch)?;
        if field.is_packed() && field.wire_type() != WireType::Length {
            // a one-element blob
            return self.append(tag, WireType::Length, payload);
        }
        self.append(tag, field.wire_type(), payload)
    }

    /// Copy the encoded bytes of `submessage` into the message field `tag`,
    /// replacing the authoritative occurrence or appending a new one.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if `tag` is not message-typed, `submessage` is
    /// invalid or lives in this message's journal.
    pub fn put_message(&mut self, tag: Tag, submessage: &Self) -> Result<()> {
        let field = self.descriptor.field_by_tag(tag).ok_or(Error::Invalid)?;
        if !field.is_message() || self.journal.ptr_eq(&submessage.journal) {
            return Err(Error::Invalid);
        }
        let mut source = submessage.clone();
        let bytes = source.to_vec()?;
        self.clear_oneof(tag)?;
        if field.label() != Label::Repeated {
            let mut cursor = Cursor::new(self, tag);
            match cursor.error() {
                None => return cursor.put_message(&source),
                Some(Error::EndOfMessage) => {}
                Some(err) => return Err(err),
            }
        }
        self.append(tag, WireType::Length, &bytes)
    }

    /// Submessage at `tag`, appending an empty one if it is absent.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if `tag` is not message-typed or the message is
    /// invalid.
    pub fn within(&mut self, tag: Tag) -> Result<Self> {
        let field = self.descriptor.field_by_tag(tag).ok_or(Error::Invalid)?;
        if !field.is_message() {
            return Err(Error::Invalid);
        }
        let mut cursor = Cursor::new(self, tag);
        match cursor.error() {
            None => {}
            Some(Error::EndOfMessage) => {
                self.clear_oneof(tag)?;
                self.append(tag, WireType::Length, &[])?;
                cursor = Cursor::new(self, tag);
            }
            Some(err) => return Err(err),
        }
        Self::from_cursor(&mut cursor)
    }

    /// Remove every occurrence of `tag`.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the message is invalid, decode errors met while
    /// scanning.
    pub fn erase_tag(&mut self, tag: Tag) -> Result<()> {
        self.align()?;
        let mut cursor = Cursor::raw(self, tag);
        while cursor.is_valid() {
            // a packed blob goes as a whole, tag and length included
            cursor.leave_packed();
            cursor.erase()?;
            cursor.next();
        }
        match cursor.error() {
            None | Some(Error::EndOfMessage) => Ok(()),
            Some(err) => Err(err),
        }
    }

    // Writing one member of a oneof removes the others.
    fn clear_oneof(&mut self, tag: Tag) -> Result<()> {
        let Some(group) = self.descriptor.field_by_tag(tag).and_then(|f| f.oneof()) else {
            return Ok(());
        };
        for member in self.descriptor.oneof_members(group) {
            if member.tag != tag {
                self.erase_tag(member.tag)?;
            }
        }
        Ok(())
    }

    // Insert a complete field (tag, length if any, payload) at the message end.
    fn append(&mut self, tag: Tag, wire_type: WireType, payload: &[u8]) -> Result<()> {
        self.align()?;
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let mut field = Vec::with_capacity(2 * MAX_VARINT_LEN + payload.len());
        field.extend_from_slice(wire::encode_varint(wire::key(tag, wire_type), &mut scratch));
        if wire_type == WireType::Length {
            field.extend_from_slice(wire::encode_varint(payload.len() as u64, &mut scratch));
        }
        field.extend_from_slice(payload);

        let offset = self.offset();
        self.journal.splice(
            self.version,
            offset.start,
            offset.end..offset.end,
            &field,
            self.frames.iter().rev().copied(),
        )?;
        self.align()
    }
}
