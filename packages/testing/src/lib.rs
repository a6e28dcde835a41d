#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in the single-outcome packages.

use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// How long a test may run (or wait for a callback) before we consider it hung.
fn hang_timeout() -> Duration {
    // Miri is dramatically slower for thread synchronization, so we use a
    // longer timeout to avoid false positives while still catching real hangs.
    if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    }
}

/// Runs a test with a timeout to prevent infinite hangs.
///
/// Asynchronous deliveries that never arrive are the typical failure mode of the code under
/// test, so anything that waits for another thread should run inside the watchdog.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog
/// is disabled and the test function is executed directly. This allows mutation
/// testing to properly detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode).
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the watchdog has already given up on us.
        drop(tx.send(result));
    });

    match rx.recv_timeout(hang_timeout()) {
        Ok(result) => {
            test_handle.join().expect("Test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("Test exceeded {:?} timeout", hang_timeout());
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // Thread panicked, join it to get the panic.
            match test_handle.join() {
                Ok(()) => panic!("Test thread disconnected unexpectedly"),
                Err(e) => std::panic::resume_unwind(e),
            }
        }
    }
}

/// Thread-safe record of every item handed to a callback, in arrival order.
///
/// Tests use this to assert how many times (and with what) a consumer was invoked, including
/// when invocations happen on other threads.
///
/// # Example
///
/// ```rust
/// use testing::Recorder;
///
/// let recorder = Recorder::new();
/// let callback = recorder.callback();
///
/// callback(1);
/// callback(2);
///
/// assert_eq!(recorder.items(), vec![1, 2]);
/// ```
pub struct Recorder<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    items: Mutex<Vec<T>>,
    item_added: Condvar,
}

impl<T> Recorder<T>
where
    T: Send + 'static,
{
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(Vec::new()),
                item_added: Condvar::new(),
            }),
        }
    }

    /// Appends an item.
    pub fn record(&self, item: T) {
        self.shared.items.lock().push(item);
        self.shared.item_added.notify_all();
    }

    /// A callback that records every item it is called with.
    #[must_use]
    pub fn callback(&self) -> impl Fn(T) + Send + Sync + 'static {
        let recorder = self.clone();
        move |item| recorder.record(item)
    }

    /// The number of items recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.items.lock().len()
    }

    /// Whether nothing has been recorded so far.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.items.lock().is_empty()
    }

    /// A copy of everything recorded so far.
    #[must_use]
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.shared.items.lock().clone()
    }

    /// Blocks until at least `count` items have been recorded, then returns a copy of them.
    ///
    /// # Panics
    ///
    /// Panics if the items do not arrive within the hang timeout.
    #[must_use]
    pub fn wait_for(&self, count: usize) -> Vec<T>
    where
        T: Clone,
    {
        let deadline = Instant::now()
            .checked_add(hang_timeout())
            .expect("deadline overflows the clock");

        let mut items = self.shared.items.lock();

        while items.len() < count {
            let timed_out = self
                .shared
                .item_added
                .wait_until(&mut items, deadline)
                .timed_out();

            assert!(
                !timed_out || items.len() >= count,
                "expected {count} recorded items but only {} arrived in time",
                items.len()
            );
        }

        items.clone()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Recorder<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Recorder<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("items", &*self.shared.items.lock())
            .finish()
    }
}
