//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The descriptor is not parseable XML.
    #[display("malformed descriptor: {_0}")]
    MalformedDocument(#[error(not(source))] String),
    /// A required descriptor element is absent (or blank).
    #[display("missing required <{_0}> in descriptor")]
    MissingField(#[error(not(source))] &'static str),
    /// The archive could not be opened or read as a zip container.
    #[display("invalid or corrupted archive")]
    InvalidArchive,
    /// Reading a descriptor from disk failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Documents and archives are content-addressed; the same bytes will
        // fail the same way every time.
        matches!(self, ErrorKind::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::MissingField("ModID").to_string(), "missing required <ModID> in descriptor");
        assert_eq!(ErrorKind::InvalidArchive.to_string(), "invalid or corrupted archive");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::MissingField("Name").is_retryable());
        assert!(!ErrorKind::MalformedDocument("eof".to_string()).is_retryable());
        assert!(ErrorKind::Io.is_retryable());
    }
}
