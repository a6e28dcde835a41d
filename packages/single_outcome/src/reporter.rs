//! Process-wide handling of failures that no subscriber handles.
//!
//! Subscribing without an error handler (via [`Single::subscribe_success()`] or
//! [`Single::subscribe_and_forget()`]) routes failures to the default failure reporter. Unless the
//! application installs its own reporter, failures are logged via `tracing` at error level.
//!
//! This is configuration meant to be set once at process start and read on every unhandled
//! failure afterwards, so reads are lock-free.
//!
//! [`Single::subscribe_success()`]: crate::Single::subscribe_success
//! [`Single::subscribe_and_forget()`]: crate::Single::subscribe_and_forget

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use tracing::error;

use crate::CallTrace;

type Reporter = Box<dyn Fn(&CallTrace, &(dyn Error + 'static)) + Send + Sync + 'static>;

static DEFAULT_FAILURE_REPORTER: ArcSwapOption<Reporter> = ArcSwapOption::const_empty();

static RECORD_CALL_TRACE: AtomicBool = AtomicBool::new(true);

/// Installs the process-wide reporter for failures that no subscriber handles.
///
/// The reporter receives the call trace of the code that subscribed (empty in release builds)
/// and the failure. It may be called from any thread. Installing a reporter replaces the
/// previous one.
///
/// # Example
///
/// ```rust
/// use single_outcome::{Single, reset_default_failure_reporter, set_default_failure_reporter};
///
/// set_default_failure_reporter(|_trace, error| {
///     eprintln!("nobody handled: {error}");
/// });
///
/// Single::<(), _>::failure(std::fmt::Error).subscribe_and_forget();
///
/// reset_default_failure_reporter();
/// ```
pub fn set_default_failure_reporter<F>(reporter: F)
where
    F: Fn(&CallTrace, &(dyn Error + 'static)) + Send + Sync + 'static,
{
    DEFAULT_FAILURE_REPORTER.store(Some(Arc::new(Box::new(reporter))));
}

/// Restores the built-in reporter, which logs unhandled failures at error level.
pub fn reset_default_failure_reporter() {
    DEFAULT_FAILURE_REPORTER.store(None);
}

/// Sets whether subscribing without an error handler captures a [`CallTrace`].
///
/// Capturing is not cheap, so applications that subscribe at high frequency may want to
/// disable it. Has no effect in release builds, where traces are never captured.
pub fn set_record_call_trace(enabled: bool) {
    RECORD_CALL_TRACE.store(enabled, Ordering::Relaxed);
}

/// Whether subscribing without an error handler captures a [`CallTrace`] in debug builds.
#[must_use]
pub fn record_call_trace() -> bool {
    RECORD_CALL_TRACE.load(Ordering::Relaxed)
}

pub(crate) fn report_unhandled_failure(trace: &CallTrace, error: &(dyn Error + 'static)) {
    let reporter = DEFAULT_FAILURE_REPORTER.load();

    match reporter.as_ref() {
        Some(reporter) => reporter(trace, error),
        None => log_unhandled_failure(trace, error),
    }
}

fn log_unhandled_failure(trace: &CallTrace, error: &(dyn Error + 'static)) {
    error!(
        %error,
        call_trace = %trace,
        "single failed and the subscriber did not supply an error handler"
    );
}
