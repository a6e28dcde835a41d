//! Operators that derive new streams from existing ones.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Event, Observer, Stream, Subscription, TapHooks};

impl<T> Stream<T>
where
    T: Send + 'static,
{
    /// Transforms every value with `transform`.
    pub fn map<U, F>(&self, transform: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let transform = Arc::new(transform);

        Stream::create(move |observer: Observer<U>| {
            let transform = Arc::clone(&transform);

            source.subscribe(move |event| match event {
                Event::Next(value) => observer.on_next(transform(value)),
                Event::Failed(error) => observer.on_failed(error),
                Event::Completed => observer.on_completed(),
            })
        })
    }

    /// Maps every value to an inner stream and merges the values of all inner streams.
    ///
    /// The result completes once this stream and every inner stream have completed. A failure
    /// from any of them fails the result immediately and cancels everything else.
    pub fn flat_map<U, F>(&self, selector: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Stream<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let selector = Arc::new(selector);

        Stream::create(move |observer: Observer<U>| {
            let group = Subscription::new();

            // The outer stream counts as one active member until it completes.
            let active = Arc::new(AtomicUsize::new(1));

            let outer_group = group.clone();
            let outer_selector = Arc::clone(&selector);
            let outer_active = Arc::clone(&active);
            let outer_observer = observer.clone();

            let outer = source.subscribe(move |event| match event {
                Event::Next(value) => {
                    let inner_stream = outer_selector(value);
                    outer_active.fetch_add(1, Ordering::AcqRel);

                    let inner_observer = outer_observer.clone();
                    let inner_active = Arc::clone(&outer_active);

                    let inner = inner_stream.subscribe(move |event| match event {
                        Event::Next(value) => inner_observer.on_next(value),
                        Event::Failed(error) => inner_observer.on_failed(error),
                        Event::Completed => {
                            complete_member(&inner_active, &inner_observer);
                        }
                    });

                    outer_group.add_subscription(inner);
                }
                Event::Failed(error) => outer_observer.on_failed(error),
                Event::Completed => complete_member(&outer_active, &outer_observer),
            });

            group.add_subscription(outer);
            group
        })
    }

    /// Attaches side-effect hooks to every subscription of this stream.
    ///
    /// The values that reach the subscriber are not altered, except that a failing
    /// [`TapHooks::on_next()`] hook turns the value into a failure.
    #[must_use]
    pub fn tap(&self, hooks: TapHooks<T>) -> Self {
        let source = self.clone();
        let hooks = Arc::new(hooks);

        Self::create(move |observer| {
            if let Some(hook) = &hooks.on_subscribe {
                hook();
            }

            let event_hooks = Arc::clone(&hooks);

            let upstream = source.subscribe(move |event| match event {
                Event::Next(value) => {
                    let verdict = event_hooks
                        .on_next
                        .as_ref()
                        .map_or(Ok(()), |hook| hook(&value));

                    match verdict {
                        Ok(()) => observer.on_next(value),
                        Err(error) => observer.on_failed(error),
                    }
                }
                Event::Failed(error) => {
                    if let Some(hook) = &event_hooks.on_failed {
                        hook(&error);
                    }

                    observer.on_failed(error);
                }
                Event::Completed => {
                    if let Some(hook) = &event_hooks.on_completed {
                        hook();
                    }

                    observer.on_completed();
                }
            });

            if let Some(hook) = &hooks.on_subscribed {
                hook();
            }

            if let Some(hook) = hooks.on_dispose.clone() {
                upstream.add(move || hook());
            }

            upstream
        })
    }
}

fn complete_member<U>(active: &AtomicUsize, observer: &Observer<U>)
where
    U: 'static,
{
    if active.fetch_sub(1, Ordering::AcqRel) == 1 {
        observer.on_completed();
    }
}
