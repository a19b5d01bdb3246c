use thiserror::Error;

/// Errors raised by the harness itself, as opposed to transport errors
/// surfaced unmodified from the provider or the explorer API.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A quantity that cannot be represented as a non-negative
    /// fixed-point amount at the requested scale.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A string that is not a decimal (or 0x-prefixed hex) integer.
    #[error("failed to parse number: {0}")]
    Parse(String),

    /// A date string none of the supported formats accept.
    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),

    /// A simulation-only operation was requested against a real network.
    #[error("{0} is only supported on a development chain")]
    Unsupported(&'static str),

    /// The explorer rejected one verification submission.
    #[error("verification of {address} failed: {message}")]
    Verification { address: String, message: String },
}
