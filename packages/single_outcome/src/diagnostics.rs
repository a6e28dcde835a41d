//! Debug-build diagnostics: call trace capture and contract violation handling.

#[cfg(debug_assertions)]
use std::backtrace::Backtrace;
use std::fmt::{self, Display};

use crate::ContractViolation;
#[cfg(debug_assertions)]
use crate::record_call_trace;

/// The call stack of the code that subscribed to a [`Single`][crate::Single], one frame
/// description per line.
///
/// Only captured if both:
///
/// 1. `cfg(debug_assertions)` is enabled (e.g. you are using the default `dev` Cargo profile).
/// 2. Recording is enabled via [`set_record_call_trace()`][crate::set_record_call_trace]
///    (the default).
///
/// Otherwise the trace is empty.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CallTrace {
    lines: Vec<String>,
}

impl CallTrace {
    /// A trace without any frames.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn capture() -> Self {
        #[cfg(debug_assertions)]
        {
            if record_call_trace() {
                let backtrace = Backtrace::force_capture().to_string();

                return Self {
                    lines: backtrace.lines().map(str::to_string).collect(),
                };
            }
        }

        Self::empty()
    }

    /// The frame descriptions, outermost call last.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether no frames were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for CallTrace {
    #[cfg_attr(test, mutants::skip)] // No API contract for the rendered form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// Reacts to a breach of the single-outcome contract.
///
/// # Panics
///
/// Always panics in debug builds. Release builds log the violation instead.
pub(crate) fn fatal_contract_violation(violation: &ContractViolation) {
    #[cfg(debug_assertions)]
    {
        panic!("single-outcome contract violated: {violation}");
    }

    #[cfg(not(debug_assertions))]
    {
        tracing::error!(%violation, "single-outcome contract violated");
    }
}
