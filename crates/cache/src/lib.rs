//! Content-addressed artifact cache.
//!
//! This crate provides the cache that makes repeated catalog builds cheap. The
//! cache is not the source of truth - the release archives are. If the cache
//! file is deleted (or corrupted), the next build simply downloads every
//! archive again.
//!
//! # Architecture
//! Entries are keyed by the digest the release host declares for an asset:
//! - **Positive entries** hold the full [`MetadataRecord`](modrepo_extract::models::MetadataRecord)
//!   extracted from the archive, including the locally computed digest.
//! - **Negative entries** record that an archive was inspected and is not a
//!   mod, so it is never downloaded again.
//!
//! Entries for digests that no longer appear in the release listing are
//! garbage collected at the end of each build.

pub mod error;
mod models;
mod store;

pub use crate::store::{ArtifactCache, Entry, Lookup};
