use thiserror::Error;

/// Failure of a stream, journal, message or cursor operation.
///
/// Errors are small and `Copy` so that a cursor can record the fault that
/// invalidated it and hand it back from every later call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was attempted on an invalid or exhausted cursor or
    /// message, on a range that was deleted by an earlier edit, or it asked
    /// for a write that cannot be expressed (e.g. a message into itself).
    #[error("invalid cursor, message or write")]
    Invalid,
    /// A scan reached the end of the message without a match.
    ///
    /// This is the regular "not found" signal. For a `oneof` member it means
    /// that a later member of the same group is the active one.
    #[error("end of message")]
    EndOfMessage,
    /// Fewer bytes remain than the encoding requires.
    #[error("unexpected end of input")]
    Truncated,
    /// A varint ran past ten bytes without a terminating byte.
    #[error("malformed varint")]
    MalformedVarint,
    /// A varint terminated, but its value does not fit the target type.
    #[error("varint overflow")]
    Overflow,
    /// A tag carried a wire type this engine cannot skip (groups or reserved
    /// values).
    #[error("unsupported wire type {0}")]
    WireType(u8),
    /// A message-level read found neither an occurrence nor a default value.
    #[error("field is absent and has no default")]
    Absent,
    /// A `string` field holds bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    Utf8,
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
