use std::any::type_name;
use std::error::Error;
use std::fmt::{self, Debug, Formatter};

use rivulet::{Stream, Subscription};

use crate::{CallTrace, Deliver, Outcome, guarded_consumer, report_unhandled_failure};

/// An asynchronous computation that delivers exactly one [`Outcome`]: a success value of type
/// `V` or a typed failure of type `E`.
///
/// A `Single` is an immutable, cold description of work. Nothing runs until you subscribe and
/// every subscription runs the work again, independently of other subscriptions. The type is
/// cheaply cloneable; all clones describe the same work.
///
/// Subscribers receive exactly one outcome per subscription, unless they cancel the
/// subscription first, in which case they receive nothing.
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use single_outcome::{Single, Subscription};
/// use testing::Recorder;
///
/// let answer = Single::<u32, String>::create(|deliver| {
///     thread::spawn(move || deliver.succeed(42));
///     Subscription::new()
/// });
///
/// let recorder = Recorder::new();
/// let record = recorder.callback();
/// answer.subscribe(record);
///
/// assert!(matches!(recorder.wait_for(1).as_slice(), [Ok(42)]));
/// ```
pub struct Single<V, E> {
    stream: Stream<Outcome<V, E>>,
}

impl<V, E> Single<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// Creates a `Single` from a factory that starts the work.
    ///
    /// The factory runs once per subscription. It receives a [`Deliver`] to hand over the
    /// outcome, either synchronously or later from any thread, and returns a [`Subscription`]
    /// whose cancellation stops the work.
    #[must_use]
    pub fn create<F>(factory: F) -> Self
    where
        F: Fn(Deliver<V, E>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            stream: Stream::create(move |observer| factory(Deliver::new(observer))),
        }
    }

    /// Creates a `Single` that immediately succeeds with a clone of `value`.
    #[must_use]
    pub fn just(value: V) -> Self
    where
        V: Clone + Sync,
    {
        Self::create(move |deliver| {
            deliver.succeed(value.clone());
            Subscription::new()
        })
    }

    /// Creates a `Single` that immediately fails with a clone of `error`.
    #[must_use]
    pub fn failure(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::create(move |deliver| {
            deliver.fail(error.clone());
            Subscription::new()
        })
    }

    /// Adopts a raw stream of outcomes.
    ///
    /// Only the first outcome the stream emits is delivered to subscribers. The stream must not
    /// use its untyped failure channel and must not complete without emitting an outcome; either
    /// is a [contract violation][crate::ContractViolation].
    #[must_use]
    pub fn from_stream(stream: Stream<Outcome<V, E>>) -> Self {
        Self { stream }
    }

    /// The underlying stream, for composing with general stream operators.
    ///
    /// Consumers of the raw stream see the outcome as a value and branch on it themselves.
    #[must_use]
    pub fn as_stream(&self) -> &Stream<Outcome<V, E>> {
        &self.stream
    }

    /// Converts into the underlying stream.
    #[must_use]
    pub fn into_stream(self) -> Stream<Outcome<V, E>> {
        self.stream
    }

    /// Runs the work and hands the outcome to `consumer`.
    ///
    /// The consumer is called exactly once, on whatever thread delivers the outcome (possibly
    /// before this method returns), unless the returned subscription is cancelled first. Once
    /// cancellation has started, an outcome that has not yet reached the consumer is dropped.
    ///
    /// If the work releases every [`Deliver`] handle without delivering an outcome, the
    /// subscription is cancelled and the consumer is never called.
    ///
    /// # Panics
    ///
    /// In debug builds, panics on the delivering or releasing thread if the underlying stream
    /// breaches the single-outcome contract. See [`ContractViolation`][crate::ContractViolation].
    pub fn subscribe<F>(&self, consumer: F) -> Subscription
    where
        F: FnOnce(Outcome<V, E>) + Send + 'static,
    {
        let (sink, guard) = guarded_consumer(consumer);

        let subscription = self.stream.subscribe(sink);
        guard.attach(&subscription);

        subscription
    }

    /// Runs the work and hands a success value to `on_success` or a failure to `on_error`.
    pub fn subscribe_with<S, F>(&self, on_success: S, on_error: F) -> Subscription
    where
        S: FnOnce(V) + Send + 'static,
        F: FnOnce(E) + Send + 'static,
    {
        self.subscribe(move |outcome| match outcome {
            Ok(value) => on_success(value),
            Err(error) => on_error(error),
        })
    }

    /// Runs the work and hands a failure to `on_error`, discarding a success value.
    pub fn subscribe_failure<F>(&self, on_error: F) -> Subscription
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.subscribe(move |outcome| {
            if let Err(error) = outcome {
                on_error(error);
            }
        })
    }

    /// Runs the work and hands a success value to `on_success`.
    ///
    /// A failure goes to the [default failure reporter][crate::set_default_failure_reporter],
    /// together with the call trace of this call (captured in debug builds only).
    pub fn subscribe_success<S>(&self, on_success: S) -> Subscription
    where
        S: FnOnce(V) + Send + 'static,
        E: Error,
    {
        let trace = CallTrace::capture();

        self.subscribe(move |outcome| match outcome {
            Ok(value) => on_success(value),
            Err(error) => report_unhandled_failure(&trace, &error),
        })
    }

    /// Runs the work for its side effects, discarding a success value.
    ///
    /// A failure goes to the [default failure reporter][crate::set_default_failure_reporter].
    pub fn subscribe_and_forget(&self) -> Subscription
    where
        E: Error,
    {
        self.subscribe_success(drop)
    }
}

impl<V, E> Clone for Single<V, E> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
        }
    }
}

impl<V, E> Debug for Single<V, E> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single")
            .field("value_type", &type_name::<V>())
            .field("error_type", &type_name::<E>())
            .finish_non_exhaustive()
    }
}
