use crate::StreamError;

/// A signal delivered to a stream subscriber.
///
/// A subscription observes zero or more [`Event::Next`] values followed by at most one terminal
/// event ([`Event::Failed`] or [`Event::Completed`]).
#[derive(Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the event vocabulary of a stream is closed"
)]
pub enum Event<T> {
    /// The stream produced a value.
    Next(T),

    /// The stream terminated with an untyped failure.
    Failed(StreamError),

    /// The stream terminated without failure.
    Completed,
}

impl<T> Event<T> {
    /// Whether no further events can follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Completed)
    }
}
