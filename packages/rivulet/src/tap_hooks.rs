use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::StreamError;

pub(crate) type LifecycleHook = Arc<dyn Fn() + Send + Sync + 'static>;
pub(crate) type NextHook<T> = Arc<dyn Fn(&T) -> Result<(), StreamError> + Send + Sync + 'static>;
pub(crate) type FailedHook = Arc<dyn Fn(&StreamError) + Send + Sync + 'static>;

/// Side-effect callbacks attached to a stream via [`Stream::tap()`][crate::Stream::tap].
///
/// All hooks are optional. Event hooks run before the event is forwarded downstream.
///
/// # Example
///
/// ```rust
/// use rivulet::{Stream, StreamError, TapHooks};
///
/// let checked = Stream::just(7).tap(
///     TapHooks::new()
///         .on_next(|value: &i32| {
///             if *value > 5 {
///                 Err(StreamError::new("value too large"))
///             } else {
///                 Ok(())
///             }
///         })
///         .on_subscribe(|| println!("subscribing")),
/// );
/// # drop(checked);
/// ```
pub struct TapHooks<T> {
    pub(crate) on_next: Option<NextHook<T>>,
    pub(crate) on_failed: Option<FailedHook>,
    pub(crate) on_completed: Option<LifecycleHook>,
    pub(crate) on_subscribe: Option<LifecycleHook>,
    pub(crate) on_subscribed: Option<LifecycleHook>,
    pub(crate) on_dispose: Option<LifecycleHook>,
}

impl<T> TapHooks<T> {
    /// Creates an empty set of hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_next: None,
            on_failed: None,
            on_completed: None,
            on_subscribe: None,
            on_subscribed: None,
            on_dispose: None,
        }
    }

    /// Called with every value before it is forwarded.
    ///
    /// If the hook returns an error, the value is not forwarded and the stream fails with that
    /// error instead.
    #[must_use]
    pub fn on_next<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), StreamError> + Send + Sync + 'static,
    {
        self.on_next = Some(Arc::new(hook));
        self
    }

    /// Called with the failure before it is forwarded.
    #[must_use]
    pub fn on_failed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        self.on_failed = Some(Arc::new(hook));
        self
    }

    /// Called before completion is forwarded.
    #[must_use]
    pub fn on_completed<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_completed = Some(Arc::new(hook));
        self
    }

    /// Called on every subscription, before the upstream work is started.
    #[must_use]
    pub fn on_subscribe<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_subscribe = Some(Arc::new(hook));
        self
    }

    /// Called on every subscription, after the upstream work has been started.
    #[must_use]
    pub fn on_subscribed<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_subscribed = Some(Arc::new(hook));
        self
    }

    /// Called when the upstream subscription is torn down, whether due to cancellation or
    /// because the stream terminated.
    #[must_use]
    pub fn on_dispose<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_dispose = Some(Arc::new(hook));
        self
    }
}

impl<T> Default for TapHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for TapHooks<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHooks")
            .field("on_next", &self.on_next.is_some())
            .field("on_failed", &self.on_failed.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_subscribe", &self.on_subscribe.is_some())
            .field("on_subscribed", &self.on_subscribed.is_some())
            .field("on_dispose", &self.on_dispose.is_some())
            .finish()
    }
}
