//! Recoverable sweep failures.
//!
//! Tape corruption is not represented here: a malformed tape panics. The only
//! failure a well-formed tape can produce is an atomic operator refusing to
//! supply the requested coefficients.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SweepError {
    /// An atomic operator's forward entry point reported failure.
    #[error("{name}: atomic forward returned false (order {order}, direction {direction})")]
    AtomicForward {
        /// Name reported by the failing operator.
        name: String,
        /// Requested Taylor order.
        order: usize,
        /// Direction being evaluated when the call failed.
        direction: usize,
    },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SweepError>;
