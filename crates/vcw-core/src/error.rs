//! # Error Types
//!
//! Leaf error types shared by every crate in the workspace. Built with
//! `thiserror`; nothing here boxes a `dyn Error`.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use a string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Domain primitive validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A calendar date was not `YYYY-MM-DD` or does not exist.
    #[error("invalid calendar date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A calendar date lies after the current UTC date.
    #[error("date '{0}' is in the future")]
    FutureDate(String),

    /// An identifier string was not a valid UUID.
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },
}
