use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::{Event, StreamError, Subscription};

pub(crate) type Sink<T> = Arc<dyn Fn(Event<T>) + Send + Sync + 'static>;

/// The producer-facing end of a subscription: emits values, a failure or completion.
///
/// Producers receive an observer for every subscription and push events into it from whatever
/// thread suits them, either synchronously during the subscribe call or at any later point.
///
/// The observer forwards events to the subscriber until it sees a terminal event or the
/// subscription is cancelled; everything after that point is dropped. Delivering a terminal event
/// cancels the subscription.
///
/// The type is cheaply cloneable; all clones feed the same subscriber.
pub struct Observer<T> {
    inner: Arc<ObserverInner<T>>,
}

struct ObserverInner<T> {
    // `None` once the observer has stopped, either due to a terminal event or cancellation.
    sink: Mutex<Option<Sink<T>>>,

    subscription: Subscription,
}

impl<T> Observer<T>
where
    T: 'static,
{
    pub(crate) fn new(sink: Sink<T>, subscription: Subscription) -> Self {
        let inner = Arc::new(ObserverInner {
            sink: Mutex::new(Some(sink)),
            subscription: subscription.clone(),
        });

        // Cancellation releases the subscriber. The observer may be kept alive by the producer
        // for arbitrarily long, so we do not want the subscription to keep it alive in turn.
        let weak_inner = Arc::downgrade(&inner);
        subscription.add(move || {
            if let Some(inner) = weak_inner.upgrade() {
                inner.sink.lock().take();
            }
        });

        Self { inner }
    }

    /// Emits a value.
    pub fn on_next(&self, value: T) {
        self.on(Event::Next(value));
    }

    /// Terminates the stream with a failure.
    pub fn on_failed(&self, error: StreamError) {
        self.on(Event::Failed(error));
    }

    /// Terminates the stream without failure.
    pub fn on_completed(&self) {
        self.on(Event::Completed);
    }

    /// Delivers an event to the subscriber, unless the observer has already stopped.
    pub fn on(&self, event: Event<T>) {
        let is_terminal = event.is_terminal();

        // The sink is user code, so we must not hold the lock while calling it.
        let sink = {
            let mut sink = self.inner.sink.lock();

            if is_terminal {
                sink.take()
            } else {
                sink.clone()
            }
        };

        let Some(sink) = sink else {
            trace!(is_terminal, "dropping event delivered after the observer stopped");
            return;
        };

        sink(event);

        if is_terminal {
            self.inner.subscription.cancel();
        }
    }

    /// Whether the observer has stopped forwarding events.
    ///
    /// Long-running producers can poll this to abandon work nobody is waiting for anymore.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.sink.lock().is_none()
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Observer<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("is_stopped", &self.inner.sink.lock().is_none())
            .field("subscription", &self.inner.subscription)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use static_assertions::assert_impl_all;
    use testing::with_watchdog;

    use super::*;
    use crate::test_utils::EventLog;

    assert_impl_all!(Observer<u32>: Send, Sync, Clone, Debug);

    fn logged_observer() -> (Observer<u32>, EventLog<u32>, Subscription) {
        let log = EventLog::new();
        let subscription = Subscription::new();
        let observer = Observer::new(Arc::new(log.sink()), subscription.clone());

        (observer, log, subscription)
    }

    #[test]
    fn forwards_values_then_completion() {
        let (observer, log, subscription) = logged_observer();

        observer.on_next(1);
        observer.on_next(2);
        observer.on_completed();

        assert_eq!(log.values(), vec![1, 2]);
        assert_eq!(log.completions(), 1);
        assert!(subscription.is_cancelled());
    }

    #[test]
    fn drops_events_after_terminal_event() {
        let (observer, log, _subscription) = logged_observer();

        observer.on_failed(StreamError::new("first"));
        observer.on_next(1);
        observer.on_failed(StreamError::new("second"));
        observer.on_completed();

        assert!(log.values().is_empty());
        assert_eq!(log.failures(), vec!["first".to_string()]);
        assert_eq!(log.completions(), 0);
        assert!(observer.is_stopped());
    }

    #[test]
    fn drops_events_after_cancel() {
        let (observer, log, subscription) = logged_observer();

        subscription.cancel();
        observer.on_next(1);
        observer.on_completed();

        assert!(log.is_empty());
        assert!(observer.is_stopped());
    }

    #[test]
    fn clones_feed_same_subscriber() {
        let (observer, log, _subscription) = logged_observer();
        let clone = observer.clone();

        observer.on_next(1);
        clone.on_next(2);
        clone.on_completed();
        observer.on_next(3);

        assert_eq!(log.values(), vec![1, 2]);
    }

    #[test]
    fn emits_from_other_thread() {
        with_watchdog(|| {
            let (observer, log, _subscription) = logged_observer();

            thread::spawn(move || {
                observer.on_next(7);
                observer.on_completed();
            })
            .join()
            .unwrap();

            assert_eq!(log.values(), vec![7]);
            assert_eq!(log.completions(), 1);
        });
    }
}
