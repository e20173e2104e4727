//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A release source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for release source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The release listing could not be retrieved; nothing can be built.
    #[display("unable to list releases")]
    Listing,
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// The server answered with a non-success status code.
    #[display("unexpected HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    /// The request exceeded the configured timeout.
    #[display("request timed out")]
    Timeout,
    /// The response body could not be decoded.
    #[display("invalid response: {_0}")]
    InvalidResponse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Listing | Self::InvalidResponse(_) => false,
        }
    }
}
