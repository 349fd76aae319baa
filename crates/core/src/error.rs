//! Error types for primecache
//!
//! Valid queries never fail: `n <= 1` is a "not prime" answer, not an error.
//! What remains are precondition violations (a bound past the configured
//! ceiling), configuration problems, and OS failures such as being unable to
//! spawn a stream producer. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.

use crate::limits::LimitError;
use std::io;
use thiserror::Error;

/// Result type alias for primecache operations
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Error types for prime queries and store construction
#[derive(Debug, Error)]
pub enum OracleError {
    /// The requested bound is larger than the store is allowed to sieve
    #[error("Bound exceeded: requested {requested}, maximum is {max}")]
    BoundExceeded {
        /// Bound asked for by the caller
        requested: u64,
        /// Configured ceiling
        max: u64,
    },

    /// Configuration could not be parsed or holds an invalid value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No sieve or oracle is registered under this name
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// I/O error (reading config files, spawning producer threads)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<LimitError> for OracleError {
    fn from(e: LimitError) -> Self {
        match e {
            LimitError::BoundTooLarge { requested, max } => {
                OracleError::BoundExceeded { requested, max }
            }
        }
    }
}
