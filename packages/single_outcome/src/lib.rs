#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Asynchronous computations that deliver exactly one outcome: a success value or a typed
//! failure.
//!
//! A [`Single<V, E>`] is a cold, re-subscribable description of work. Every subscription runs
//! the work and hands the subscriber exactly one [`Outcome<V, E>`]. Failures are values of your
//! own error type `E`, carried through the same channel as successes, so they keep their type
//! across every combinator.
//!
//! The primitive is a thin layer over the [`rivulet`] stream engine, which supplies
//! subscription, cancellation and threading. The layer adds what a general stream does not
//! promise:
//!
//! * The subscriber receives at most one outcome per subscription, even if the producer
//!   misbehaves and delivers more than once (or from several threads at the same time).
//! * Failures never travel through the untyped failure channel of the stream. An untyped failure
//!   or a completion without an outcome is a contract violation, which panics in debug builds
//!   and is logged as an error in release builds.
//! * A failure nobody handles is handed to the process-wide
//!   [default failure reporter][set_default_failure_reporter] instead of being dropped.
//!
//! # Example
//!
//! ```rust
//! use single_outcome::{Single, Subscription};
//! use testing::Recorder;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("lookup failed")]
//! struct LookupError;
//!
//! fn lookup_user_id(name: &'static str) -> Single<u64, LookupError> {
//!     Single::create(move |deliver| {
//!         if name == "ferris" {
//!             deliver.succeed(42);
//!         } else {
//!             deliver.fail(LookupError);
//!         }
//!         Subscription::new()
//!     })
//! }
//!
//! let recorder = Recorder::new();
//! let record = recorder.callback();
//!
//! lookup_user_id("ferris")
//!     .map(|id| id * 2)
//!     .subscribe_with(record, |error| panic!("unexpected failure: {error}"));
//!
//! assert_eq!(recorder.items(), vec![84]);
//! ```
//!
//! # Awaiting
//!
//! A [`Single`] can be awaited directly. Dropping the future cancels the work.
//!
//! ```rust
//! use std::io;
//!
//! use futures::executor::block_on;
//! use single_outcome::Single;
//!
//! let greeting = Single::<_, io::Error>::just("hello");
//!
//! let outcome = block_on(async { greeting.await });
//! assert_eq!(outcome.unwrap(), "hello");
//! ```

mod combinators;
mod deliver;
mod diagnostics;
mod error;
mod future;
mod guard;
mod reporter;
mod single;
mod single_hooks;

pub use deliver::*;
pub use diagnostics::CallTrace;
pub(crate) use diagnostics::fatal_contract_violation;
pub use error::*;
pub use future::*;
pub(crate) use guard::*;
pub use reporter::*;
pub use rivulet::Subscription;
pub use single::*;
pub use single_hooks::*;

/// The result of a [`Single`]: either a success value or a typed failure.
pub type Outcome<V, E> = Result<V, E>;
