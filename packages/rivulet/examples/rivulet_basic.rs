//! Subscribes to a stream produced on a background thread and shows how cancellation stops
//! delivery.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rivulet::{Event, Stream, Subscription};

fn main() {
    let ticks = Stream::create(|observer| {
        thread::spawn(move || {
            for tick in 0_u32.. {
                if observer.is_stopped() {
                    println!("producer noticed cancellation after {tick} ticks");
                    return;
                }

                observer.on_next(tick);
                thread::sleep(Duration::from_millis(10));
            }
        });

        Subscription::new()
    });

    let (tx, rx) = mpsc::channel();

    let subscription = ticks.map(|tick| tick * 2).subscribe(move |event| {
        if let Event::Next(value) = event {
            // The receiver may already be gone once we cancel; that is fine.
            drop(tx.send(value));
        }
    });

    for _ in 0..5 {
        let value = rx.recv().expect("producer stopped unexpectedly");
        println!("received {value}");
    }

    subscription.cancel();
    println!("cancelled: {}", subscription.is_cancelled());

    // Give the producer a moment to notice.
    thread::sleep(Duration::from_millis(50));
}
