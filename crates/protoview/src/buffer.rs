use alloc::{borrow::Cow, vec::Vec};
use core::ops::Deref;

/// An immutable byte range: either a zero-copy view into memory owned by the
/// caller or an owned region.
///
/// A `Buffer` is never mutated in place; the [`Journal`](crate::Journal)
/// takes one over as the initial content of a message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer<'a> {
    data: Cow<'a, [u8]>,
}

impl<'a> Buffer<'a> {
    /// View over existing memory.
    #[must_use]
    pub fn zero_copy(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
        }
    }

    /// Whether this buffer borrows its bytes.
    #[must_use]
    pub fn is_zero_copy(&self) -> bool {
        matches!(self.data, Cow::Borrowed(_))
    }

    /// Bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Owned copy of the bytes; free for owned buffers.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_owned()
    }
}

impl Buffer<'static> {
    /// Buffer owning `data`.
    #[must_use]
    pub fn owned(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
        }
    }
}

impl Deref for Buffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for Buffer<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<'a> From<&'a [u8]> for Buffer<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::zero_copy(data)
    }
}

impl From<Vec<u8>> for Buffer<'static> {
    fn from(data: Vec<u8>) -> Self {
        Self::owned(data)
    }
}
