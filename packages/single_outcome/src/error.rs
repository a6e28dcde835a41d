use thiserror::Error;

/// A breach of the single-outcome contract by whatever drives the underlying stream.
///
/// These are programming errors, not domain failures: they are never converted into an
/// [`Outcome`][crate::Outcome]. In debug builds they panic; in release builds they are logged
/// as errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContractViolation {
    /// The underlying stream emitted an untyped failure, bypassing the typed failure channel.
    #[error("single emitted an untyped stream failure instead of a typed outcome: {message}")]
    UntypedFailure {
        /// The message of the untyped failure.
        message: String,
    },

    /// The underlying stream completed before emitting an outcome.
    #[error("single completed without emitting an outcome")]
    CompletedWithoutOutcome,

    /// The producer released every handle to its subscriber without delivering an outcome.
    #[error("single was abandoned by its producer without emitting an outcome")]
    Abandoned,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ContractViolation: Send, Sync, Debug);

    #[test]
    fn untyped_failure_mentions_original_message() {
        let violation = ContractViolation::UntypedFailure {
            message: "socket closed".to_string(),
        };

        assert!(violation.to_string().contains("socket closed"));
    }
}
