use std::any::type_name;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::{Event, Observer, StreamError, Subscription};

type Producer<T> = Arc<dyn Fn(Observer<T>) -> Subscription + Send + Sync + 'static>;

/// A cold stream of values of type `T`, terminated by a failure or a completion signal.
///
/// The stream itself is an immutable description of work. Every call to
/// [`subscribe()`][Self::subscribe] runs the producer again, independently of any other
/// subscription.
///
/// The type is cheaply cloneable; all clones describe the same work.
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use rivulet::{Stream, Subscription};
///
/// let answer = Stream::create(|observer| {
///     thread::spawn(move || {
///         observer.on_next(42);
///         observer.on_completed();
///     });
///
///     Subscription::new()
/// });
///
/// let (tx, rx) = std::sync::mpsc::channel();
/// answer.subscribe_with(
///     move |value| tx.send(value).unwrap(),
///     |error| panic!("unexpected failure: {error}"),
///     || {},
/// );
///
/// assert_eq!(rx.recv().unwrap(), 42);
/// ```
pub struct Stream<T> {
    producer: Producer<T>,
}

impl<T> Stream<T>
where
    T: Send + 'static,
{
    /// Creates a stream from a producer function.
    ///
    /// The producer is called once per subscription with the [`Observer`] to emit events into.
    /// It returns a [`Subscription`] whose cancellation stops the work it started. Producers that
    /// finish their work synchronously can return [`Subscription::new()`].
    #[must_use]
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// A stream that emits a clone of `value` and completes.
    #[must_use]
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |observer| {
            observer.on_next(value.clone());
            observer.on_completed();
            Subscription::new()
        })
    }

    /// A stream that fails immediately with the error returned by `make_error`.
    #[must_use]
    pub fn fail<F>(make_error: F) -> Self
    where
        F: Fn() -> StreamError + Send + Sync + 'static,
    {
        Self::create(move |observer| {
            observer.on_failed(make_error());
            Subscription::new()
        })
    }

    /// A stream that completes immediately without emitting any values.
    #[must_use]
    pub fn empty() -> Self {
        Self::create(|observer| {
            observer.on_completed();
            Subscription::new()
        })
    }

    /// A stream that never emits anything.
    #[must_use]
    pub fn never() -> Self {
        Self::create(|_| Subscription::new())
    }

    /// Subscribes `sink` to receive the events of this stream.
    ///
    /// The sink may be called from any thread, including synchronously before this method
    /// returns. The returned [`Subscription`] is cancelled automatically once a terminal event
    /// has been delivered.
    pub fn subscribe<F>(&self, sink: F) -> Subscription
    where
        F: Fn(Event<T>) + Send + Sync + 'static,
    {
        let subscription = Subscription::new();
        let observer = Observer::new(Arc::new(sink), subscription.clone());

        let upstream = (self.producer)(observer);

        // If the producer already terminated, this cancels the upstream immediately.
        subscription.add_subscription(upstream);

        subscription
    }

    /// Subscribes separate callbacks for values, failure and completion.
    pub fn subscribe_with<N, F, C>(&self, on_next: N, on_failed: F, on_completed: C) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
        F: Fn(StreamError) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.subscribe(move |event| match event {
            Event::Next(value) => on_next(value),
            Event::Failed(error) => on_failed(error),
            Event::Completed => on_completed(),
        })
    }
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> Debug for Stream<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("item_type", &type_name::<T>())
            .finish_non_exhaustive()
    }
}
