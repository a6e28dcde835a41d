use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use parking_lot::Mutex;
use rivulet::{Event, Subscription};
use tracing::trace;

use crate::{ContractViolation, Outcome, fatal_contract_violation};

/// Per-subscription latch that lets exactly one terminal event through.
///
/// The latch is claimed either by the first event or by cancellation of the subscription,
/// whichever comes first. Delivery may race with both, so claiming is a single atomic step.
#[derive(Debug, Default)]
pub(crate) struct DeliveryGuard {
    claimed: AtomicBool,

    // Set once the consumer is released without an outcome and without cancellation.
    abandoned: AtomicBool,

    // `None` until the subscribe call has returned.
    subscription: Mutex<Option<Subscription>>,
}

impl DeliveryGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for the first caller only.
    pub(crate) fn try_claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Binds the guard to the subscription returned by the subscribe call.
    ///
    /// Cancelling the subscription claims the guard, so an event that was already on its way
    /// when cancellation started no longer reaches the consumer.
    pub(crate) fn attach(self: &Arc<Self>, subscription: &Subscription) {
        let mut slot = self.subscription.lock();

        if self.abandoned.load(Ordering::Acquire) {
            drop(slot);

            // The producer gave up before the subscribe call even returned.
            subscription.cancel();
            return;
        }

        *slot = Some(subscription.clone());
        drop(slot);

        let guard = Arc::downgrade(self);
        subscription.add(move || {
            if let Some(guard) = guard.upgrade() {
                guard.try_claim();
            }
        });
    }

    // Called when the consumer is dropped, for whatever reason.
    fn release(&self) {
        if self.is_claimed() {
            return;
        }

        let subscription = {
            let mut slot = self.subscription.lock();

            if slot.as_ref().is_some_and(Subscription::is_cancelled) {
                return;
            }

            self.abandoned.store(true, Ordering::Release);
            slot.take()
        };

        if let Some(subscription) = subscription {
            subscription.cancel();
        }

        // A panic elsewhere is already unwinding through the producer; do not pile on.
        if !thread::panicking() {
            fatal_contract_violation(&ContractViolation::Abandoned);
        }
    }
}

// Holds the consumer until it is called. Dropping it without an outcome and without
// cancellation means the producer abandoned the subscription.
struct ConsumerSlot<F> {
    consumer: Mutex<Option<F>>,
    guard: Arc<DeliveryGuard>,
}

impl<F> Drop for ConsumerSlot<F> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Adapts a one-shot outcome consumer into an engine-level event sink.
///
/// The first `Next` reaches the consumer. The completion that normally follows it is expected
/// and ignored, as is anything a misbehaving upstream emits afterwards. An untyped failure, a
/// completion without an outcome or a sink released without either is a breach of the contract
/// and is fatal.
///
/// The returned guard must be [attached][DeliveryGuard::attach] to the subscription once the
/// subscribe call returns.
pub(crate) fn guarded_consumer<V, E, F>(
    consumer: F,
) -> (
    impl Fn(Event<Outcome<V, E>>) + Send + Sync + 'static,
    Arc<DeliveryGuard>,
)
where
    V: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Outcome<V, E>) + Send + 'static,
{
    let guard = Arc::new(DeliveryGuard::new());

    let slot = ConsumerSlot {
        consumer: Mutex::new(Some(consumer)),
        guard: Arc::clone(&guard),
    };

    let sink = move |event| {
        if matches!(event, Event::Completed) && slot.guard.is_claimed() {
            return;
        }

        if !slot.guard.try_claim() {
            trace!("delivery guard ignored an event after delivery or cancellation");
            return;
        }

        match event {
            Event::Next(outcome) => {
                // Taken out before calling so the lock is not held while user code runs.
                let consumer = slot.consumer.lock().take();

                if let Some(consumer) = consumer {
                    consumer(outcome);
                }
            }
            Event::Failed(error) => {
                fatal_contract_violation(&ContractViolation::UntypedFailure {
                    message: error.to_string(),
                });
            }
            Event::Completed => {
                fatal_contract_violation(&ContractViolation::CompletedWithoutOutcome);
            }
        }
    };

    (sink, guard)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use rivulet::StreamError;
    use testing::{Recorder, with_watchdog};

    use super::*;

    type Sink = Arc<dyn Fn(Event<Outcome<u32, String>>) + Send + Sync>;

    fn recording_sink() -> (Sink, Arc<DeliveryGuard>, Recorder<Outcome<u32, String>>) {
        let recorder = Recorder::new();
        let (sink, guard) = guarded_consumer(recorder.callback());
        let sink: Sink = Arc::new(sink);

        (sink, guard, recorder)
    }

    #[test]
    fn claim_succeeds_once() {
        let guard = DeliveryGuard::new();

        assert!(!guard.is_claimed());
        assert!(guard.try_claim());
        assert!(!guard.try_claim());
        assert!(guard.is_claimed());
    }

    #[test]
    fn forwards_first_outcome_and_ignores_completion() {
        let (sink, _guard, recorder) = recording_sink();

        sink(Event::Next(Ok(1)));
        sink(Event::Completed);

        assert_eq!(recorder.items(), vec![Ok(1)]);
    }

    #[test]
    fn ignores_second_outcome() {
        let (sink, _guard, recorder) = recording_sink();

        sink(Event::Next(Err("first".to_string())));
        sink(Event::Next(Ok(2)));
        sink(Event::Failed(StreamError::new("late")));

        assert_eq!(recorder.items(), vec![Err("first".to_string())]);
    }

    #[test]
    fn event_in_flight_during_cancel_is_dropped() {
        let (sink, guard, recorder) = recording_sink();
        let subscription = Subscription::new();
        guard.attach(&subscription);

        // The sink was already cloned by an emitter when cancellation started.
        let in_flight = Arc::clone(&sink);
        subscription.cancel();
        drop(sink);

        in_flight(Event::Next(Ok(1)));

        assert!(recorder.is_empty());
    }

    #[test]
    fn releasing_after_cancel_is_not_abandonment() {
        let (sink, guard, recorder) = recording_sink();
        let subscription = Subscription::new();
        guard.attach(&subscription);

        subscription.cancel();
        drop(sink);

        assert!(recorder.is_empty());
    }

    #[test]
    fn releasing_after_delivery_is_not_abandonment() {
        let (sink, guard, _recorder) = recording_sink();
        guard.attach(&Subscription::new());

        sink(Event::Next(Ok(1)));
        drop(sink);

        assert!(!guard.abandoned.load(Ordering::Acquire));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "abandoned")]
    fn releasing_without_outcome_is_fatal() {
        let (sink, guard, _recorder) = recording_sink();
        guard.attach(&Subscription::new());

        drop(sink);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn releasing_without_outcome_cancels_subscription() {
        let (sink, guard, _recorder) = recording_sink();
        let subscription = Subscription::new();
        guard.attach(&subscription);

        drop(sink);

        assert!(subscription.is_cancelled());
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn releasing_before_attach_cancels_on_attach() {
        let (sink, guard, _recorder) = recording_sink();
        drop(sink);

        let subscription = Subscription::new();
        guard.attach(&subscription);

        assert!(subscription.is_cancelled());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "untyped failure")]
    fn untyped_failure_is_fatal() {
        let (sink, _guard, _recorder) = recording_sink();

        sink(Event::Failed(StreamError::new("boom")));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "completed without emitting an outcome")]
    fn completion_without_outcome_is_fatal() {
        let (sink, _guard, _recorder) = recording_sink();

        sink(Event::Completed);
    }

    #[test]
    fn racing_deliveries_reach_consumer_once() {
        with_watchdog(|| {
            for _ in 0..100 {
                let (sink, _guard, recorder) = recording_sink();

                let threads = (0..4)
                    .map(|index| {
                        let sink = Arc::clone(&sink);
                        thread::spawn(move || sink(Event::Next(Ok(index))))
                    })
                    .collect::<Vec<_>>();

                for thread in threads {
                    thread.join().unwrap();
                }

                assert_eq!(recorder.len(), 1);
            }
        });
    }
}
