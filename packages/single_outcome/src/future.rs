use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use rivulet::Subscription;
use tracing::trace;

use crate::{Outcome, Single};

/// Awaits the outcome of one subscription to a [`Single`].
///
/// Created by awaiting a [`Single`] or by [`Single::to_future()`]. The work starts when the
/// future is created, not when it is first polled.
///
/// Dropping the future before it completes cancels the subscription.
///
/// # Panics
///
/// In debug builds, the thread that releases the last [`Deliver`][crate::Deliver] handle
/// without delivering an outcome panics. In release builds the violation is logged and the
/// future never completes.
pub struct SingleFuture<V, E> {
    receiver: oneshot::Receiver<Outcome<V, E>>,
    subscription: Subscription,
}

impl<V, E> Future for SingleFuture<V, E> {
    type Output = Outcome<V, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => {
                // The consumer was released without an outcome, which the delivery guard has
                // already reported.
                trace!("single future will never complete because its work was abandoned");
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<V, E> Drop for SingleFuture<V, E> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

impl<V, E> Debug for SingleFuture<V, E> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFuture")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl<V, E> Single<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// Subscribes and returns a future that resolves to the outcome.
    ///
    /// Equivalent to awaiting a clone of the `Single`.
    #[must_use]
    pub fn to_future(&self) -> SingleFuture<V, E> {
        let (sender, receiver) = oneshot::channel();

        let subscription = self.subscribe(move |outcome| {
            // The receiver is gone if the future was dropped, in which case nobody cares.
            drop(sender.send(outcome));
        });

        SingleFuture {
            receiver,
            subscription,
        }
    }
}

impl<V, E> IntoFuture for Single<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    type Output = Outcome<V, E>;
    type IntoFuture = SingleFuture<V, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.to_future()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use futures::executor::block_on;
    use static_assertions::assert_impl_all;
    use testing::with_watchdog;

    use super::*;

    assert_impl_all!(SingleFuture<u32, String>: Send, Sync, Unpin, Debug);

    #[test]
    fn awaits_immediate_outcome() {
        let single = Single::<u32, String>::just(3);

        assert_eq!(block_on(single.to_future()), Ok(3));
        assert_eq!(block_on(async { single.await }), Ok(3));
    }

    #[test]
    fn awaits_failure() {
        let single = Single::<u32, String>::failure("down".to_string());

        assert_eq!(block_on(single.to_future()), Err("down".to_string()));
    }

    #[test]
    fn awaits_outcome_from_other_thread() {
        with_watchdog(|| {
            let single = Single::<u32, String>::create(|deliver| {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10));
                    deliver.succeed(11);
                });
                Subscription::new()
            });

            assert_eq!(block_on(single.to_future()), Ok(11));
        });
    }

    #[test]
    fn drop_cancels_work() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let teardown_flag = Arc::clone(&cancelled);

        let single = Single::<u32, String>::create(move |deliver| {
            let teardown_flag = Arc::clone(&teardown_flag);
            Subscription::from_fn(move || {
                drop(deliver);
                teardown_flag.store(true, Ordering::Relaxed);
            })
        });

        let future = single.to_future();
        assert!(!cancelled.load(Ordering::Relaxed));

        drop(future);
        assert!(cancelled.load(Ordering::Relaxed));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "abandoned")]
    fn abandoned_work_panics_in_debug_builds() {
        let single = Single::<u32, String>::create(|deliver| {
            drop(deliver);
            Subscription::new()
        });

        drop(block_on(single.to_future()));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn abandoned_work_leaves_future_pending() {
        use std::task::Waker;

        let single = Single::<u32, String>::create(|deliver| {
            drop(deliver);
            Subscription::new()
        });

        let mut future = single.to_future();
        let mut cx = Context::from_waker(Waker::noop());

        assert!(Pin::new(&mut future).poll(&mut cx).is_pending());
        assert!(future.subscription.is_cancelled());
    }
}
