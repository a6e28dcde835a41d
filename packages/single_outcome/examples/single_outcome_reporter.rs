//! Installs a default failure reporter that collects failures nobody handled.

use std::io;

use single_outcome::{Single, reset_default_failure_reporter, set_default_failure_reporter};

fn main() {
    set_default_failure_reporter(|trace, error| {
        println!("unhandled failure: {error}");

        if trace.is_empty() {
            println!("(no call trace; release build or recording disabled)");
        } else {
            println!("subscribed at:\n{trace}");
        }
    });

    Single::<u32, _>::failure(io::ErrorKind::NotFound)
        .map_err(io::Error::from)
        .subscribe_success(|value| println!("got {value}"));

    reset_default_failure_reporter();
}
