//! Raw access to the encoded value at a cursor's position.

use crate::{
    cursor::{Context, Cursor},
    error::{Error, Result},
    journal::Offset,
};

/// The encoded value (without tag and length) of the current occurrence.
///
/// Writes through a part replace bytes verbatim and keep every enclosing
/// length prefix consistent; no type checking happens at this level.
#[derive(Debug, Clone, Copy)]
pub struct Part<'c> {
    cursor: &'c Cursor,
}

impl<'c> Part<'c> {
    /// Part at the cursor's current occurrence.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid or erased cursor, or if the cursor
    /// cannot be aligned.
    pub fn from_cursor(cursor: &'c mut Cursor) -> Result<Self> {
        cursor.align()?;
        if cursor.is_erased() {
            return Err(Error::Invalid);
        }
        Ok(Self::new(cursor))
    }

    /// Caller guarantees `cursor` is aligned.
    pub(crate) fn new(cursor: &'c Cursor) -> Self {
        Self { cursor }
    }

    /// Range of the value.
    #[must_use]
    pub fn offset(&self) -> Offset {
        self.cursor.current()
    }

    /// Whether the value lies inside a packed blob.
    #[must_use]
    pub fn is_packed(&self) -> bool {
        matches!(self.cursor.context(), Context::Packed { .. })
    }

    /// Replace the value with `bytes`.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the range no longer fits the journal.
    pub fn write(self, bytes: &[u8]) -> Result<()> {
        let target = self.offset();
        self.cursor.journal().splice(
            self.cursor.version(),
            target.start,
            target.start..target.end,
            bytes,
            self.cursor.enclosing(true),
        )
    }

    /// Remove the value together with its tag and length; a packed element
    /// only loses its own bytes.
    pub(crate) fn clear(self) -> Result<()> {
        let target = self.offset();
        let range = if self.is_packed() {
            target.start..target.end
        } else {
            target.field_range()
        };
        self.cursor.journal().splice(
            self.cursor.version(),
            target.start,
            range,
            &[],
            self.cursor.enclosing(false),
        )
    }
}
