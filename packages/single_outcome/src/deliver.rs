use std::fmt::{self, Debug, Formatter};

use rivulet::Observer;

use crate::Outcome;

/// Hands the outcome of a [`Single`][crate::Single] to its subscriber.
///
/// A `Deliver` is passed to the factory of [`Single::create()`][crate::Single::create] on every
/// subscription. The factory (or whatever it spawns) calls one of the delivery methods once the
/// work has an outcome, from any thread.
///
/// Only the first delivery reaches the subscriber. Later deliveries, and deliveries after the
/// subscription has been cancelled, are dropped.
///
/// Dropping every clone without delivering, while the subscription is still active, abandons
/// the subscriber. That is a [contract violation][crate::ContractViolation::Abandoned]: the
/// subscription is cancelled and, in debug builds, the dropping thread panics.
///
/// The type is cheaply cloneable; all clones deliver to the same subscriber.
pub struct Deliver<V, E> {
    observer: Observer<Outcome<V, E>>,
}

impl<V, E> Deliver<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(observer: Observer<Outcome<V, E>>) -> Self {
        Self { observer }
    }

    /// Delivers an outcome.
    pub fn deliver(&self, outcome: Outcome<V, E>) {
        // The completion that follows the outcome terminates the underlying stream, which
        // releases the subscriber and cancels the work.
        self.observer.on_next(outcome);
        self.observer.on_completed();
    }

    /// Delivers a success value.
    pub fn succeed(&self, value: V) {
        self.deliver(Ok(value));
    }

    /// Delivers a typed failure.
    pub fn fail(&self, error: E) {
        self.deliver(Err(error));
    }

    /// Whether nobody is waiting for the outcome anymore, either because it has already been
    /// delivered or because the subscription was cancelled.
    ///
    /// Long-running work can poll this to stop early.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.observer.is_stopped()
    }
}

impl<V, E> Clone for Deliver<V, E> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
        }
    }
}

impl<V, E> Debug for Deliver<V, E> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deliver")
            .field("observer", &self.observer)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rivulet::{Event, Stream, Subscription};
    use static_assertions::assert_impl_all;
    use testing::Recorder;

    use super::*;

    assert_impl_all!(Deliver<u32, String>: Send, Sync, Clone, Debug);

    // Records the engine-level events as labels, e.g. `next Ok(3)` or `completed`.
    fn delivering<F>(work: F) -> Vec<String>
    where
        F: Fn(Deliver<u32, String>) + Send + Sync + 'static,
    {
        let recorder = Recorder::new();
        let record = recorder.callback();

        Stream::create(move |observer| {
            work(Deliver::new(observer));
            Subscription::new()
        })
        .subscribe(move |event: Event<Outcome<u32, String>>| {
            record(match event {
                Event::Next(outcome) => format!("next {outcome:?}"),
                Event::Failed(error) => format!("failed {error}"),
                Event::Completed => "completed".to_string(),
            });
        });

        recorder.items()
    }

    #[test]
    fn succeed_emits_outcome_then_completion() {
        let events = delivering(|deliver| deliver.succeed(3));

        assert_eq!(events, vec!["next Ok(3)", "completed"]);
    }

    #[test]
    fn fail_travels_as_value_not_untyped_failure() {
        let events = delivering(|deliver| deliver.fail("bad".to_string()));

        assert_eq!(events, vec![r#"next Err("bad")"#, "completed"]);
    }

    #[test]
    fn second_delivery_is_dropped() {
        let events = delivering(|deliver| {
            deliver.succeed(1);
            assert!(deliver.is_cancelled());
            deliver.succeed(2);
        });

        assert_eq!(events, vec!["next Ok(1)", "completed"]);
    }
}
