//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a catalog failure.
///
/// ### Fatal Errors
/// - [`ErrorKind::Listing`]
/// - [`ErrorKind::Interrupted`]
///
/// ### Per-Asset Errors
/// Caught at the asset boundary, reported, and never abort the build.
/// - [`ErrorKind::Transport`]
/// - [`ErrorKind::Archive`]
/// - [`ErrorKind::Extract`]
///
/// ### Output Errors
/// - [`ErrorKind::Serialize`]
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The release listing could not be retrieved.
    #[display("unable to list releases")]
    Listing,
    /// The build stream ended before it completed.
    #[display("build ended before completion")]
    Interrupted,
    /// Downloading the archive failed (status, timeout, connection).
    #[display("unable to download archive")]
    Transport,
    /// The downloaded bytes are not a readable zip archive.
    #[display("unreadable archive")]
    Archive,
    /// The archive's descriptor is malformed or missing required fields.
    #[display("invalid descriptor")]
    Extract,
    /// Writing the catalog document failed.
    #[display("unable to write catalog")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Listing | Self::Transport)
    }
}
