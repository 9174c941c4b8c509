//! The versioned backing store of one message tree.
//!
//! Overview
//! - A [`Journal`] owns the only mutable copy of the encoded bytes. Every
//!   message, cursor, field and part over the tree holds a handle to it,
//!   never a copy of the bytes.
//! - All mutation funnels through [`Journal::resize`], which replaces a byte
//!   range in place, shifts everything behind it, bumps the version and
//!   appends an [`Edit`] record.
//!
//! Staleness
//! - Views cache [`Offset`]s together with the version they were computed
//!   at. Edits are never broadcast; a view that is about to read or write
//!   through a cached offset first calls [`Journal::align`], which replays
//!   the edits made since that version. An edit costs O(1), catching up costs
//!   O(edits since last use) and is paid only by views that are used again.
//! - Replaying one edit against a range has exactly five outcomes: the range
//!   grows (the edit is inside its value, or appends at its end on behalf of
//!   an enclosed structure), moves (the edit is in front of it, or rewrites
//!   its own length prefix), stays (the edit is behind it), or is
//!   invalidated (the edit removed or straddled its tag/length prefix).
//!
//! Length prefixes
//! - Resizing a value inside a submessage changes the length of every
//!   enclosing length-delimited range. [`Journal::splice`] performs the
//!   value edit and then rewrites each enclosing prefix, innermost first; a
//!   prefix varint that changes width is itself an ordinary edit.

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Ref, RefCell},
    ops::Range,
};

use tracing::{debug, trace};

use crate::{
    buffer::Buffer,
    error::{Error, Result},
    options::JournalOptions,
    wire::{self, MAX_VARINT_LEN},
};

/// Monotonic edit counter of a [`Journal`].
pub type Version = usize;

/// Positions of a value's tag, length prefix and enclosing message, relative
/// to the value's own start.
///
/// All three are zero or negative. Zero `tag` and `length` mean the range has
/// no prefix of its own (a message root or an element of a packed blob); zero
/// `length` alone means the wire type carries no length varint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Diff {
    /// Start of the enclosing message's value.
    pub origin: isize,
    /// Start of the tag varint.
    pub tag: isize,
    /// Start of the length varint.
    pub length: isize,
}

/// A cached byte range `[start, end)` of a value, plus the relative position
/// of its prefix, valid at some journal [`Version`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    /// First byte of the value.
    pub start: usize,
    /// One past the last byte of the value.
    pub end: usize,
    /// Prefix and origin positions relative to `start`.
    pub diff: Diff,
}

impl Offset {
    /// Range without prefix whose origin is its own start.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            diff: Diff::default(),
        }
    }

    /// Length of the value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Absolute position of the tag (the value start if there is none).
    #[must_use]
    pub fn prefix_start(&self) -> usize {
        self.start.saturating_add_signed(self.diff.tag)
    }

    /// Absolute position of the length varint.
    #[must_use]
    pub fn length_start(&self) -> usize {
        self.start.saturating_add_signed(self.diff.length)
    }

    /// Absolute start of the enclosing message's value.
    #[must_use]
    pub fn origin(&self) -> usize {
        self.start.saturating_add_signed(self.diff.origin)
    }

    /// Whether the value is preceded by a length varint.
    #[must_use]
    pub fn has_length_prefix(&self) -> bool {
        self.diff.length < 0
    }

    /// The whole encoded field: tag, length and value.
    #[must_use]
    pub fn field_range(&self) -> Range<usize> {
        self.prefix_start()..self.end
    }

    fn shift(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }

    /// Reflect one edit in this range.
    fn replay(&mut self, edit: &Edit) -> Result<()> {
        let (at, until, delta) = (edit.offset, edit.end(), edit.delta());
        let prefix = self.prefix_start();
        if edit.old_len == 0 && at == self.end && edit.origin >= self.start {
            // append into this range or into a range it encloses
            self.end = self.end.saturating_add_signed(delta);
        } else if until <= prefix {
            if until > self.origin() {
                self.diff.origin -= delta;
            }
            self.shift(delta);
        } else if at >= self.end {
            // behind us
        } else if at >= self.start && until <= self.end {
            self.end = self.end.saturating_add_signed(delta);
        } else if at >= prefix && until <= self.start && edit.new_len > 0 {
            // own length prefix rewritten
            self.shift(delta);
            self.diff.tag -= delta;
            self.diff.length -= delta;
            self.diff.origin -= delta;
        } else {
            return Err(Error::Invalid);
        }
        Ok(())
    }
}

/// One applied resize: `old_len` bytes at `offset` were replaced by
/// `new_len` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    /// Value start of the structure the edit was made on behalf of.
    ///
    /// Only consulted for insertions at a range's end, to tell the
    /// structures that grow from siblings that merely end there.
    pub origin: usize,
    /// First replaced byte.
    pub offset: usize,
    /// Length of the replaced range.
    pub old_len: usize,
    /// Length of the replacement.
    pub new_len: usize,
}

impl Edit {
    /// One past the last replaced byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.old_len
    }

    /// Change in total length.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn delta(&self) -> isize {
        self.new_len as isize - self.old_len as isize
    }
}

#[derive(Debug)]
struct Inner {
    data: Vec<u8>,
    edits: Vec<Edit>,
    options: JournalOptions,
}

/// Shared handle to the bytes and edit log of one message tree.
///
/// Cloning the handle is cheap and yields another reference to the same
/// journal. Single-threaded by construction; hosts sharing bytes across
/// threads must copy them out (see [`Journal::to_vec`]).
#[derive(Debug, Clone)]
pub struct Journal {
    inner: Rc<RefCell<Inner>>,
}

impl Journal {
    /// Journal owning `bytes`.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::with_options(bytes, JournalOptions::default())
    }

    /// Journal owning `bytes`, configured by `options`.
    #[must_use]
    pub fn with_options(bytes: Vec<u8>, options: JournalOptions) -> Self {
        let mut data = bytes;
        data.reserve(options.reserve);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                data,
                edits: Vec::new(),
                options,
            })),
        }
    }

    /// Journal taking over the content of `buffer`; a zero-copy buffer is
    /// copied once here.
    #[must_use]
    pub fn from_buffer(buffer: Buffer<'_>) -> Self {
        Self::new(buffer.into_vec())
    }

    /// Options the journal was created with.
    #[must_use]
    pub fn options(&self) -> JournalOptions {
        self.inner.borrow().options
    }

    /// Number of edits applied so far.
    #[must_use]
    pub fn version(&self) -> Version {
        self.inner.borrow().edits.len()
    }

    /// Current length of the encoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().data.len()
    }

    /// Whether the journal holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().data.is_empty()
    }

    /// Current bytes from `offset` to the end, without copying.
    ///
    /// The returned guard must be dropped before the journal is edited.
    #[must_use]
    pub fn data_from(&self, offset: usize) -> Ref<'_, [u8]> {
        Ref::map(self.inner.borrow(), |inner| {
            &inner.data[offset.min(inner.data.len())..]
        })
    }

    /// Copy of the current bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.borrow().data.clone()
    }

    /// The edit that produced version `version + 1`, if it exists.
    #[must_use]
    pub fn edit(&self, version: Version) -> Option<Edit> {
        self.inner.borrow().edits.get(version).copied()
    }

    /// Whether both handles refer to the same journal.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Replace `old_len` bytes at `offset` with `bytes`, on behalf of the
    /// structure whose value starts at `origin`.
    ///
    /// Every byte behind the range moves; the version is bumped and the edit
    /// recorded before returning. Returns the new version.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the range lies outside the current bytes.
    pub fn resize(
        &self,
        origin: usize,
        offset: usize,
        old_len: usize,
        bytes: &[u8],
    ) -> Result<Version> {
        let mut inner = self.inner.borrow_mut();
        let end = offset.checked_add(old_len).ok_or(Error::Invalid)?;
        if end > inner.data.len() {
            return Err(Error::Invalid);
        }
        inner.data.splice(offset..end, bytes.iter().copied());
        let edit = Edit {
            origin,
            offset,
            old_len,
            new_len: bytes.len(),
        };
        inner.edits.push(edit);
        let version = inner.edits.len();
        trace!(offset, old_len, new_len = bytes.len(), version, "journal resize");
        Ok(version)
    }

    /// Bring `offset`, last known correct at `version`, up to date.
    ///
    /// A no-op when `version` is current. On success both arguments are
    /// updated; on failure neither is touched.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if an edit since `version` removed or straddled the
    /// range's prefix, or `version` does not belong to this journal.
    pub fn align(&self, version: &mut Version, offset: &mut Offset) -> Result<()> {
        let inner = self.inner.borrow();
        let current = inner.edits.len();
        if *version == current {
            return Ok(());
        }
        let Some(edits) = inner.edits.get(*version..) else {
            return Err(Error::Invalid);
        };
        let mut aligned = *offset;
        for edit in edits {
            if let Err(err) = aligned.replay(edit) {
                debug!(?edit, start = offset.start, end = offset.end, "range removed by edit");
                return Err(err);
            }
        }
        if aligned.end > inner.data.len() {
            return Err(Error::Invalid);
        }
        trace!(from = *version, to = current, start = aligned.start, end = aligned.end, "aligned");
        *offset = aligned;
        *version = current;
        Ok(())
    }

    /// Replace `range` with `bytes` and rewrite the length prefix of every
    /// `enclosing` range, innermost first.
    ///
    /// All enclosing ranges must be valid at `version`. Ranges without a
    /// length prefix are skipped. To change a length-delimited value, pass the
    /// value's own offset as the first enclosing range.
    pub(crate) fn splice(
        &self,
        version: Version,
        origin: usize,
        range: Range<usize>,
        bytes: &[u8],
        enclosing: impl IntoIterator<Item = Offset>,
    ) -> Result<()> {
        self.resize(origin, range.start, range.len(), bytes)?;
        for mut frame in enclosing {
            if !frame.has_length_prefix() {
                continue;
            }
            let mut at = version;
            self.align(&mut at, &mut frame)?;
            self.rewrite_prefix(&frame)?;
        }
        Ok(())
    }

    fn rewrite_prefix(&self, frame: &Offset) -> Result<()> {
        let at = frame.length_start();
        let old_len = frame.start - at;
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let encoded = wire::encode_varint(frame.len() as u64, &mut scratch);
        let unchanged = self.data_from(at).get(..old_len) == Some(encoded);
        if unchanged {
            return Ok(());
        }
        self.resize(frame.start, at, old_len, encoded).map(drop)
    }
}
