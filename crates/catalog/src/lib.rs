//! Builds the mod catalog: one deterministic XML document listing every mod
//! version published as a release archive.
//!
//! The pipeline, per build:
//! 1. list releases from a [`ReleaseSource`](modrepo_source::ReleaseSource),
//! 2. resolve each archive-shaped asset through the
//!    [`ArtifactCache`](modrepo_cache::ArtifactCache), downloading and
//!    inspecting only on a miss,
//! 3. collect the records and sort them by `(id, version, branches)`,
//! 4. garbage collect cache entries for digests no longer published,
//! 5. [`render`] the catalog.
//!
//! Nothing here touches the filesystem: persisting the catalog and the cache
//! is left to the caller.

mod build;
pub mod error;
mod render;
mod summary;

pub use crate::build::{
    BuildEvent, BuildOptions, BuildOutput, DEFAULT_CONCURRENCY, DEFAULT_EXTENSION, Resolution, build, build_stream,
    fetch_archive,
};
pub use crate::render::render;
pub use crate::summary::Summary;
