#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Cold, callback-driven event streams.
//!
//! A [`Stream<T>`] describes a producer that, once subscribed, emits zero or more values
//! followed by at most one terminal event: either an untyped failure or a completion signal.
//! Streams are cold: every subscription runs the producer again from scratch.
//!
//! Every subscribe call returns a [`Subscription`], which can be used to cancel the work
//! before it terminates. After cancellation, the subscriber observes no further events.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use rivulet::{Event, Stream, Subscription};
//!
//! let numbers = Stream::create(|observer| {
//!     observer.on_next(1);
//!     observer.on_next(2);
//!     observer.on_completed();
//!     Subscription::new()
//! });
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = Arc::clone(&seen);
//!
//! numbers.map(|n| n * 10).subscribe(move |event| {
//!     if let Event::Next(value) = event {
//!         seen_clone.lock().unwrap().push(value);
//!     }
//! });
//!
//! assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
//! ```
//!
//! # Event grammar
//!
//! Producers must not emit events concurrently with each other on the same observer. Within that
//! constraint, the engine guarantees:
//!
//! * Nothing reaches the subscriber after a terminal event.
//! * Nothing reaches the subscriber after its subscription has been cancelled.
//! * A terminal event cancels the subscription, which runs the producer's teardown logic.

mod error;
mod event;
mod observer;
mod operators;
mod stream;
mod subscription;
mod tap_hooks;
#[cfg(test)]
mod test_utils;

pub use error::*;
pub use event::*;
pub use observer::*;
pub use stream::*;
pub use subscription::*;
pub use tap_hooks::*;
