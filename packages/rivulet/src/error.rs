use std::error::Error;
use std::fmt::{self, Display};

/// An untyped failure travelling through the failure channel of a stream.
///
/// Any error type can be wrapped. The original error can be inspected via
/// [`downcast_ref()`][Self::downcast_ref] or recovered via [`into_inner()`][Self::into_inner].
///
/// # Example
///
/// ```rust
/// use std::io;
///
/// use rivulet::StreamError;
///
/// let error = StreamError::new(io::Error::other("disk on fire"));
///
/// assert!(error.is::<io::Error>());
/// assert_eq!(error.to_string(), "disk on fire");
/// ```
#[derive(Debug)]
pub struct StreamError {
    inner: Box<dyn Error + Send + Sync + 'static>,
}

impl StreamError {
    /// Wraps an error (or anything convertible to a boxed error, such as a string).
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self {
            inner: error.into(),
        }
    }

    /// Whether the wrapped error is of type `E`.
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.inner.is::<E>()
    }

    /// Returns the wrapped error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Unwraps the original boxed error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync + 'static> {
        self.inner
    }
}

impl Display for StreamError {
    #[cfg_attr(test, mutants::skip)] // Delegates to the wrapped error, which owns the message.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// Transparent wrapper: the wrapped error already renders via our Display, so we expose its
// source chain rather than the wrapped error itself.
impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(StreamError: Send, Sync, Error);

    #[test]
    fn wraps_string_message() {
        let error = StreamError::new("boom");

        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn downcast_to_original_type() {
        let error = StreamError::new(io::Error::new(io::ErrorKind::NotFound, "gone"));

        assert!(error.is::<io::Error>());
        assert_eq!(
            error.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
        assert!(error.downcast_ref::<fmt::Error>().is_none());
    }

    #[test]
    fn into_inner_returns_original() {
        let error = StreamError::new(io::Error::other("original"));

        let inner = error.into_inner();
        assert_eq!(inner.to_string(), "original");
    }
}
