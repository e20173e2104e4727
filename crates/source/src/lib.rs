//! Where releases and their archives come from.
//!
//! Two seams, each a trait so the catalog builder never talks to the network
//! directly:
//! - [`ReleaseSource`]: the ordered release listing of one repository
//!   ([`GitHubSource`] for the real thing).
//! - [`ArchiveFetcher`]: retrieves an archive's bytes from its download URL
//!   ([`HttpFetcher`] for the real thing).
//!
//! The `mock` feature adds in-memory implementations of both for tests.

pub mod error;
mod github;
mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod models;

pub use crate::github::{DEFAULT_API_BASE, GitHubSource};
pub use crate::http::HttpFetcher;
use crate::error::Result;
use crate::models::Release;
use async_trait::async_trait;
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ReleaseSource + Send + Sync>;
pub type FetcherHandle = Arc<dyn ArchiveFetcher + Send + Sync>;

/// The release listing of one repository.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Human-readable name of the source (used for logging only).
    fn name(&self) -> &str;

    /// Every release, in the host's listing order (newest first on GitHub).
    ///
    /// The listing is all-or-nothing: any failure is a
    /// [`Listing`](crate::error::ErrorKind::Listing) error.
    async fn releases(&self) -> Result<Vec<Release>>;
}

/// Retrieves archive bytes.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download the complete archive at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
