//! Integration tests for the event grammar guaranteed to stream subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rivulet::{Event, Stream, StreamError, Subscription, TapHooks};
use testing::{Recorder, with_watchdog};

fn describe(event: Event<u32>) -> String {
    match event {
        Event::Next(value) => format!("next {value}"),
        Event::Failed(error) => format!("failed {error}"),
        Event::Completed => "completed".to_string(),
    }
}

#[test]
fn misbehaving_producer_is_cut_off_after_terminal_event() {
    let recorder = Recorder::new();
    let record = recorder.callback();

    Stream::create(|observer| {
        observer.on_next(1);
        observer.on_completed();
        observer.on_next(2);
        observer.on_failed(StreamError::new("late"));
        observer.on_completed();
        Subscription::new()
    })
    .subscribe(move |event| record(describe(event)));

    assert_eq!(recorder.items(), vec!["next 1", "completed"]);
}

#[test]
fn producer_on_other_thread_delivers_everything() {
    with_watchdog(|| {
        let recorder = Recorder::new();
        let record = recorder.callback();

        Stream::create(|observer| {
            thread::spawn(move || {
                for value in 0..3 {
                    observer.on_next(value);
                }
                observer.on_completed();
            });
            Subscription::new()
        })
        .subscribe(move |event| record(describe(event)));

        assert_eq!(
            recorder.wait_for(4),
            vec!["next 0", "next 1", "next 2", "completed"]
        );
    });
}

#[test]
fn long_running_producer_can_observe_cancellation() {
    with_watchdog(|| {
        let stopped = Recorder::new();
        let stopped_clone = stopped.clone();

        let stream = Stream::<u32>::create(move |observer| {
            let stopped = stopped_clone.clone();

            thread::spawn(move || {
                while !observer.is_stopped() {
                    thread::yield_now();
                }
                stopped.record(());
            });

            Subscription::new()
        });

        let subscription = stream.subscribe(|_| {});
        subscription.cancel();

        let _stopped = stopped.wait_for(1);
        assert!(subscription.is_cancelled());
    });
}

#[test]
fn operators_compose() {
    let recorder = Recorder::new();
    let record = recorder.callback();
    let subscribed = Arc::new(AtomicUsize::new(0));
    let subscribed_clone = Arc::clone(&subscribed);

    Stream::just(2_u32)
        .map(|value| value + 1)
        .flat_map(|value| Stream::just(value * 10))
        .tap(TapHooks::new().on_subscribe(move || {
            subscribed_clone.fetch_add(1, Ordering::Relaxed);
        }))
        .subscribe(move |event| record(describe(event)));

    assert_eq!(recorder.items(), vec!["next 30", "completed"]);
    assert_eq!(subscribed.load(Ordering::Relaxed), 1);
}
