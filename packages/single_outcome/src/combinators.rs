//! Combinators that derive new [`Single`]s from existing ones.
//!
//! Failures propagate through every combinator as typed values; no combinator ever uses the
//! untyped failure channel of the underlying stream.

use std::sync::Arc;

use parking_lot::Mutex;
use rivulet::{Stream, Subscription};

use crate::{Outcome, Single, SingleHooks};

impl<V, E> Single<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// Continues with the `Single` that `selector` returns for the success value.
    ///
    /// A failure skips `selector` and is delivered unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use single_outcome::Single;
    /// use testing::Recorder;
    ///
    /// let recorder = Recorder::new();
    ///
    /// Single::<u32, String>::just(20)
    ///     .bind(|value| Single::just(value + 1))
    ///     .subscribe(recorder.callback());
    ///
    /// assert_eq!(recorder.items(), vec![Ok(21)]);
    /// ```
    #[must_use]
    pub fn bind<U, F>(&self, selector: F) -> Single<U, E>
    where
        U: Send + 'static,
        F: Fn(V) -> Single<U, E> + Send + Sync + 'static,
    {
        self.try_bind(move |value| Ok(selector(value)))
    }

    /// Like [`bind()`][Self::bind] but for selectors that can fail before producing a `Single`.
    ///
    /// A selector failure becomes the failure of the result.
    #[must_use]
    pub fn try_bind<U, F>(&self, selector: F) -> Single<U, E>
    where
        U: Send + 'static,
        F: Fn(V) -> Result<Single<U, E>, E> + Send + Sync + 'static,
    {
        Single::from_stream(
            self.as_stream()
                .flat_map(move |outcome| match outcome.and_then(&selector) {
                    Ok(next) => next.into_stream(),
                    Err(error) => settled(Err(error)),
                }),
        )
    }

    /// Transforms the success value.
    #[must_use]
    pub fn map<U, F>(&self, transform: F) -> Single<U, E>
    where
        U: Send + 'static,
        F: Fn(V) -> U + Send + Sync + 'static,
    {
        Single::from_stream(self.as_stream().map(move |outcome| outcome.map(&transform)))
    }

    /// Transforms the failure.
    #[must_use]
    pub fn map_err<E2, F>(&self, transform: F) -> Single<V, E2>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        Single::from_stream(self.as_stream().map(move |outcome| outcome.map_err(&transform)))
    }

    /// Attaches side-effect hooks to every subscription.
    ///
    /// See [`SingleHooks`] for when each hook fires and how hook failures are delivered.
    #[must_use]
    pub fn tap(&self, mut hooks: SingleHooks<V, E>) -> Self {
        let source = Self::from_stream(self.as_stream().tap(hooks.take_lifecycle()));
        let hooks = Arc::new(hooks);

        Self::create(move |deliver| {
            let hooks = Arc::clone(&hooks);

            source.subscribe(move |outcome| {
                let outcome = hooks.apply_before(outcome);
                let after = hooks.prepare_after(&outcome);

                deliver.deliver(outcome);

                if let Some(after) = after {
                    after();
                }
            })
        })
    }
}

// A stream that emits `outcome` to its first subscriber. Only used as a one-off inner stream.
fn settled<U, E>(outcome: Outcome<U, E>) -> Stream<Outcome<U, E>>
where
    U: Send + 'static,
    E: Send + 'static,
{
    let outcome = Mutex::new(Some(outcome));

    Stream::create(move |observer| {
        let outcome = outcome.lock().take();

        if let Some(outcome) = outcome {
            observer.on_next(outcome);
        }

        observer.on_completed();
        Subscription::new()
    })
}
