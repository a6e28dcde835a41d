//! Awaits singles from async code and shows that dropping the future cancels the work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use futures::executor::block_on;
use single_outcome::{Single, Subscription};

fn slow_square(value: u64) -> Single<u64, String> {
    Single::create(move |deliver| {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        thread::spawn(move || {
            for _ in 0..10 {
                if worker_stop.load(Ordering::Relaxed) {
                    println!("square of {value} abandoned");
                    return;
                }

                thread::sleep(Duration::from_millis(5));
            }

            deliver.succeed(value * value);
        });

        Subscription::from_fn(move || stop.store(true, Ordering::Relaxed))
    })
}

fn main() {
    let total = block_on(async {
        let first = slow_square(3).await?;
        let second = slow_square(4).await?;
        Ok::<_, String>(first + second)
    });

    println!("sum of squares: {total:?}");

    let abandoned = slow_square(5).to_future();
    drop(abandoned);

    // Give the worker a moment to notice.
    thread::sleep(Duration::from_millis(20));
}
