//! Typed access to the scalar value at a cursor's position.

use crate::{
    cursor::Cursor,
    descriptor::FieldDescriptor,
    error::{Error, Result},
    part::Part,
    value::Value,
    wire::MAX_VARINT_LEN,
};

/// The current occurrence of a scalar, string or bytes field.
#[derive(Debug, Clone, Copy)]
pub struct Field<'c> {
    cursor: &'c Cursor,
    descriptor: &'static FieldDescriptor,
}

impl<'c> Field<'c> {
    /// Field at the cursor's current occurrence.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] on an invalid or erased cursor, or a message-typed
    /// field.
    pub fn from_cursor(cursor: &'c mut Cursor) -> Result<Self> {
        cursor.align()?;
        let cursor: &'c Cursor = cursor;
        let descriptor = cursor.descriptor().ok_or(Error::Invalid)?;
        if descriptor.is_message() {
            return Err(Error::Invalid);
        }
        if cursor.is_erased() {
            return Err(Error::Invalid);
        }
        Ok(Self { cursor, descriptor })
    }

    /// Descriptor of the field.
    #[must_use]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// Decode the value.
    ///
    /// # Errors
    ///
    /// Decode errors of [`Value::decode`].
    pub fn get(&self) -> Result<Value> {
        let offset = self.cursor.current();
        let data = self.cursor.journal().data_from(offset.start);
        let payload = data.get(..offset.len()).ok_or(Error::Invalid)?;
        Value::decode(self.descriptor.ty, payload)
    }

    /// Whether the value decodes and equals `value`.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.get().is_ok_and(|current| current == *value)
    }

    /// Encode `value` and write it over the current value.
    ///
    /// Writing the identical encoding leaves the journal untouched.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if `value` does not fit the field's type.
    pub fn put(self, value: &Value) -> Result<()> {
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let bytes = value.encode(self.descriptor.ty, &mut scratch)?;
        let offset = self.cursor.current();
        let unchanged = {
            let data = self.cursor.journal().data_from(offset.start);
            data.get(..offset.len()) == Some(bytes)
        };
        if unchanged {
            return Ok(());
        }
        Part::new(self.cursor).write(bytes)
    }

    /// Remove the occurrence: the whole field, or one element of a packed
    /// blob.
    ///
    /// # Errors
    ///
    /// [`Error::Invalid`] if the range no longer fits the journal.
    pub fn clear(self) -> Result<()> {
        Part::new(self.cursor).clear()
    }
}
