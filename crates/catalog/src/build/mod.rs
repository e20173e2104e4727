//! Catalog build orchestration.
//!
//! Walks a [`ReleaseSource`](modrepo_source::ReleaseSource) listing, resolves
//! every archive-shaped asset through the [`ArtifactCache`] (downloading and
//! inspecting on a miss), and collects the resulting records into catalog
//! order.
//!
//! The primary entry point is [`build_stream`], which reports progress as a
//! stream of [`BuildEvent`]s; [`build`] drives that stream to completion for
//! callers that only want the result.

mod asset;
mod stream;

pub use self::asset::fetch_archive;
pub use self::stream::{BuildEvent, Resolution, build_stream};
use crate::error::{ErrorKind, Result};
use crate::render::render;
use crate::summary::Summary;
use futures::StreamExt;
use modrepo_cache::ArtifactCache;
use modrepo_extract::models::MetadataRecord;
use modrepo_source::{FetcherHandle, SourceHandle};
use std::pin::pin;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_EXTENSION: &str = ".zip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// File name extension (matched case-insensitively) of archive-shaped
    /// assets.
    pub extension: String,
    /// Maximum number of downloads in flight.
    pub concurrency: usize,
}
impl Default for BuildOptions {
    fn default() -> Self {
        Self { extension: DEFAULT_EXTENSION.to_string(), concurrency: DEFAULT_CONCURRENCY }
    }
}

/// The result of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Every record, in catalog order.
    pub records: Vec<MetadataRecord>,
    pub summary: Summary,
}
impl BuildOutput {
    /// Render the catalog document.
    pub fn catalog(&self) -> Result<String> {
        render(&self.records)
    }
}

/// Runs [`build_stream`] to completion and returns its output.
///
/// `cache` is updated in place (new entries stored, stale entries collected);
/// persisting it is up to the caller.
pub async fn build(
    source: &SourceHandle,
    fetcher: &FetcherHandle,
    cache: &mut ArtifactCache,
    options: &BuildOptions,
) -> Result<BuildOutput> {
    let mut events = pin!(build_stream(source, fetcher, cache, options));
    while let Some(event) = events.next().await {
        if let BuildEvent::Complete(output) = event? {
            return Ok(*output);
        }
    }
    exn::bail!(ErrorKind::Interrupted)
}
