use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

type Teardown = Box<dyn FnOnce() + Send + 'static>;

/// A handle to a subscription, used to cancel it.
///
/// Cancelling runs every teardown action registered on the subscription, exactly once and in
/// registration order. Teardown actions registered after cancellation run immediately.
///
/// The type is cheaply cloneable; all clones refer to the same subscription. Dropping a handle
/// does not cancel the subscription.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// use rivulet::Subscription;
///
/// let torn_down = Arc::new(AtomicBool::new(false));
/// let torn_down_clone = Arc::clone(&torn_down);
///
/// let subscription = Subscription::from_fn(move || torn_down_clone.store(true, Ordering::Relaxed));
/// assert!(!subscription.is_cancelled());
///
/// subscription.cancel();
/// assert!(subscription.is_cancelled());
/// assert!(torn_down.load(Ordering::Relaxed));
/// ```
#[derive(Clone)]
pub struct Subscription {
    // `None` once the subscription has been cancelled.
    teardowns: Arc<Mutex<Option<Vec<Teardown>>>>,
}

impl Subscription {
    /// Creates an active subscription without any teardown actions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            teardowns: Arc::new(Mutex::new(Some(Vec::new()))),
        }
    }

    /// Creates an active subscription that runs `teardown` when cancelled.
    #[must_use]
    pub fn from_fn<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let subscription = Self::new();
        subscription.add(teardown);
        subscription
    }

    /// Creates a subscription that is already cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            teardowns: Arc::new(Mutex::new(None)),
        }
    }

    /// Registers a teardown action to run on cancellation.
    ///
    /// If the subscription is already cancelled, the action runs immediately on the current
    /// thread.
    pub fn add<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(teardowns) = self.teardowns.lock().as_mut() {
            teardowns.push(Box::new(teardown));
            return;
        }

        teardown();
    }

    /// Cancels `child` whenever this subscription is cancelled.
    pub fn add_subscription(&self, child: Self) {
        if Arc::ptr_eq(&self.teardowns, &child.teardowns) {
            return;
        }

        self.add(move || child.cancel());
    }

    /// Cancels the subscription. Calling this more than once has no further effect.
    ///
    /// Events emitted after this call starts are dropped. An event that another thread was
    /// already handing to the subscriber may still arrive, possibly after this call returns.
    pub fn cancel(&self) {
        // We release the lock before running teardown because teardown actions are user code
        // and may well touch this same subscription again.
        let teardowns = self.teardowns.lock().take();

        for teardown in teardowns.into_iter().flatten() {
            teardown();
        }
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.teardowns.lock().is_none()
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Subscription {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("is_cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
