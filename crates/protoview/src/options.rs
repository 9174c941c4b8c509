/// Configuration of a [`Journal`](crate::Journal).
///
/// # Default
///
/// No extra capacity is reserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalOptions {
    /// Extra capacity reserved in the backing buffer up front.
    ///
    /// Writes that grow the message (longer varints, longer strings, appended
    /// fields) then shift bytes inside the existing allocation instead of
    /// reallocating it.
    ///
    /// # Default
    ///
    /// `0`
    pub reserve: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic when a cursor records a fault other than
    /// [`Error::EndOfMessage`](crate::Error::EndOfMessage).
    ///
    /// Enabled only in test and fuzzing builds to produce backtraces.
    pub panic_on_error: bool,
}
