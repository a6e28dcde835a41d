use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::sync::Arc;

use rivulet::TapHooks;

use crate::Outcome;

type BeforeHook<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync + 'static>;

/// Work to run once the outcome has reached the downstream consumer.
pub(crate) type AfterCall = Box<dyn FnOnce() + Send + 'static>;

// Runs while the outcome is still borrowed and returns the part that runs after delivery.
type AfterHook<T> = Arc<dyn Fn(&T) -> AfterCall + Send + Sync + 'static>;

/// Side-effect callbacks attached to a [`Single`][crate::Single] via
/// [`Single::tap()`][crate::Single::tap].
///
/// All hooks are optional and observe the outcome without changing it, with one exception:
/// if [`on_success`][Self::on_success] or [`on_error`][Self::on_error] fails, the downstream
/// consumer receives the hook's failure instead of the original outcome.
///
/// The hooks fire in this order for a subscription that runs to completion:
///
/// 1. `on_subscribe`, before the upstream work is started.
/// 2. `on_success` or `on_error`, before the outcome is delivered downstream.
/// 3. `after_success` or `after_error`, after the downstream consumer has returned.
/// 4. `on_subscribed`, once the upstream work has been started.
/// 5. `on_dispose`, when the upstream subscription ends.
///
/// If the work delivers asynchronously, steps 2 and 3 happen after step 4.
///
/// # Example
///
/// ```rust
/// use single_outcome::{Single, SingleHooks};
///
/// let audited = Single::<u32, String>::just(7).tap(
///     SingleHooks::new()
///         .on_success(|value| {
///             if *value > 100 {
///                 Err(format!("{value} is over budget"))
///             } else {
///                 Ok(())
///             }
///         })
///         .after_success(|value| println!("delivered {value}")),
/// );
/// # drop(audited);
/// ```
pub struct SingleHooks<V, E> {
    on_success: Option<BeforeHook<V, E>>,
    on_error: Option<BeforeHook<E, E>>,
    after_success: Option<AfterHook<V>>,
    after_error: Option<AfterHook<E>>,
    lifecycle: TapHooks<Outcome<V, E>>,
}

impl<V, E> SingleHooks<V, E> {
    /// Creates an empty set of hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
            after_success: None,
            after_error: None,
            lifecycle: TapHooks::new(),
        }
    }

    /// Called with the success value before it is delivered downstream.
    ///
    /// If the hook returns an error, the downstream consumer receives that error as the
    /// failure of this stage instead of the success value.
    #[must_use]
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&V) -> Result<(), E> + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(hook));
        self
    }

    /// Called with the failure before it is delivered downstream.
    ///
    /// If the hook returns an error, the downstream consumer receives that error in place of
    /// the original failure.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E) -> Result<(), E> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Called with a clone of the success value after the downstream consumer has returned.
    #[must_use]
    pub fn after_success<F>(mut self, hook: F) -> Self
    where
        V: Clone + Send + 'static,
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.after_success = Some(deferred(hook));
        self
    }

    /// Called with a clone of the failure after the downstream consumer has returned.
    #[must_use]
    pub fn after_error<F>(mut self, hook: F) -> Self
    where
        E: Clone + Send + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.after_error = Some(deferred(hook));
        self
    }

    /// Called on every subscription, before the upstream work is started.
    #[must_use]
    pub fn on_subscribe<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lifecycle = self.lifecycle.on_subscribe(hook);
        self
    }

    /// Called on every subscription, after the upstream work has been started.
    #[must_use]
    pub fn on_subscribed<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lifecycle = self.lifecycle.on_subscribed(hook);
        self
    }

    /// Called when the upstream subscription ends, either because the outcome was delivered or
    /// because the subscription was cancelled.
    #[must_use]
    pub fn on_dispose<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lifecycle = self.lifecycle.on_dispose(hook);
        self
    }

    pub(crate) fn take_lifecycle(&mut self) -> TapHooks<Outcome<V, E>> {
        mem::take(&mut self.lifecycle)
    }

    /// Runs the fallible hook for the outcome. A hook failure replaces the outcome.
    pub(crate) fn apply_before(&self, outcome: Outcome<V, E>) -> Outcome<V, E> {
        let verdict = match &outcome {
            Ok(value) => self.on_success.as_ref().map_or(Ok(()), |hook| hook(value)),
            Err(error) => self.on_error.as_ref().map_or(Ok(()), |hook| hook(error)),
        };

        verdict.and(outcome)
    }

    pub(crate) fn prepare_after(&self, outcome: &Outcome<V, E>) -> Option<AfterCall> {
        match outcome {
            Ok(value) => self.after_success.as_ref().map(|hook| hook(value)),
            Err(error) => self.after_error.as_ref().map(|hook| hook(error)),
        }
    }
}

fn deferred<T, F>(hook: F) -> AfterHook<T>
where
    T: Clone + Send + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    let hook = Arc::new(hook);

    Arc::new(move |item: &T| {
        let hook = Arc::clone(&hook);
        let item = item.clone();

        Box::new(move || hook(&item)) as AfterCall
    })
}

impl<V, E> Default for SingleHooks<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Debug for SingleHooks<V, E> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleHooks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("after_success", &self.after_success.is_some())
            .field("after_error", &self.after_error.is_some())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
