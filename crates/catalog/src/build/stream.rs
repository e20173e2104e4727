use crate::build::asset::fetch_archive;
use crate::build::{BuildOptions, BuildOutput};
use crate::error::{Error, ErrorKind, Result};
use crate::summary::Summary;
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use modrepo_cache::{ArtifactCache, Entry, Lookup};
use modrepo_extract::Inspection;
use modrepo_extract::models::MetadataRecord;
use modrepo_source::{FetcherHandle, SourceHandle};
use std::collections::{HashMap, HashSet, VecDeque};

/// How a single asset was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Answered from a positive cache entry; nothing was downloaded.
    Cached(MetadataRecord),
    /// Answered from a negative cache entry; nothing was downloaded.
    KnownNotAMod,
    /// Downloaded, and the archive carries a descriptor.
    Fetched(MetadataRecord),
    /// Downloaded, and the archive carries no descriptor. It will not be
    /// downloaded again while it stays published.
    NotAMod,
}
impl Resolution {
    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            Self::Cached(record) | Self::Fetched(record) => Some(record),
            Self::KnownNotAMod | Self::NotAMod => None,
        }
    }
}

/// Progress events emitted by [`build_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) - exactly once.
/// 2. [`Discovered`](Self::Discovered) - exactly once, with the release count.
/// 3. [`ReleaseSkipped`](Self::ReleaseSkipped) / [`ReleaseStarted`](Self::ReleaseStarted)
///    once per release, in listing order, interleaved with the
///    [`AssetResolved`](Self::AssetResolved) events of cache hits.
/// 4. [`AssetResolved`](Self::AssetResolved) / [`AssetFailed`](Self::AssetFailed)
///    for every downloaded asset, in completion order.
/// 5. [`Complete`](Self::Complete) - exactly once, signalling the stream is
///    finished.
///
/// A listing failure is yielded as an `Err` and terminates the stream, in which
/// case [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum BuildEvent {
    Started,
    Discovered { releases: usize },
    ReleaseSkipped { release: String },
    ReleaseStarted { release: String },
    AssetResolved { release: String, asset: String, resolution: Resolution },
    AssetFailed { release: String, asset: String, error: Error },
    Complete(Box<BuildOutput>),
}

/// (release index, asset index) in listing order.
type Position = (usize, usize);

struct Referrer {
    position: Position,
    release: String,
    asset: String,
}

/// A cache miss waiting to be downloaded, and every asset that declared its
/// digest.
struct PendingFetch {
    digest: String,
    url: String,
    referrers: Vec<Referrer>,
}

/// Streams [`BuildEvent`]s while resolving every asset of every release in
/// `source` into the catalog.
///
/// Cache lookups happen while the listing is walked; only misses are
/// downloaded, up to `options.concurrency` at a time. Assets that declare the
/// same digest share one download. Cache writes happen here, one at a time,
/// as downloads complete, and garbage collection runs once everything has been
/// resolved.
///
/// Per-asset failures are reported as [`AssetFailed`](BuildEvent::AssetFailed)
/// events and never terminate the stream; only a listing failure is fatal.
pub fn build_stream<'a>(
    source: &'a SourceHandle,
    fetcher: &'a FetcherHandle,
    cache: &'a mut ArtifactCache,
    options: &'a BuildOptions,
) -> impl Stream<Item = Result<BuildEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(BuildEvent::Started);

        let releases = match source.releases().await.or_raise(|| ErrorKind::Listing) {
            Ok(releases) => releases,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(source = source.name(), releases = releases.len(), "Listed releases");
        yield Ok(BuildEvent::Discovered { releases: releases.len() });

        let mut summary = Summary { releases: releases.len(), ..Summary::default() };
        let mut live: HashSet<String> = HashSet::new();
        let mut records: Vec<(Position, MetadataRecord)> = Vec::new();
        let mut pending: Vec<PendingFetch> = Vec::new();
        let mut pending_by_digest: HashMap<String, usize> = HashMap::new();

        for (release_index, release) in releases.iter().enumerate() {
            if !release.has_archive(&options.extension) {
                tracing::info!(release = %release.tag, "Skipping release without archives");
                summary.releases_skipped += 1;
                yield Ok(BuildEvent::ReleaseSkipped { release: release.tag.clone() });
                continue;
            }
            tracing::info!(release = %release.tag, "Handling release");
            yield Ok(BuildEvent::ReleaseStarted { release: release.tag.clone() });

            for (asset_index, asset) in release.assets.iter().enumerate() {
                if !asset.is_resolvable(&options.extension) {
                    continue;
                }
                let Some(digest) = asset.declared_digest() else {
                    continue;
                };
                summary.assets += 1;
                live.insert(digest.to_string());
                let referrer = Referrer {
                    position: (release_index, asset_index),
                    release: release.tag.clone(),
                    asset: asset.name.clone(),
                };
                if let Some(&index) = pending_by_digest.get(digest) {
                    pending[index].referrers.push(referrer);
                    continue;
                }
                let resolution = match cache.lookup(digest) {
                    Lookup::Hit(record) => Resolution::Cached(record.clone()),
                    Lookup::NegativeHit => Resolution::KnownNotAMod,
                    Lookup::Miss => {
                        pending_by_digest.insert(digest.to_string(), pending.len());
                        pending.push(PendingFetch {
                            digest: digest.to_string(),
                            url: asset.url.clone(),
                            referrers: vec![referrer],
                        });
                        continue;
                    },
                };
                tracing::debug!(release = %referrer.release, asset = %referrer.asset, digest, "Resolved from cache");
                summary.count(&resolution);
                if let Some(record) = resolution.record() {
                    records.push((referrer.position, record.clone()));
                }
                yield Ok(BuildEvent::AssetResolved { release: referrer.release, asset: referrer.asset, resolution });
            }
        }

        let mut queue: VecDeque<_> = pending.into_iter().map(|fetch| download(fetcher, fetch)).collect();
        let mut processing = FuturesUnordered::new();
        processing.extend(queue.drain(..options.concurrency.max(1).min(queue.len())));
        while let Some((fetch, outcome)) = processing.next().await {
            if let Some(next) = queue.pop_front() {
                processing.push(next);
            }
            summary.fetched += 1;
            match outcome {
                Ok(inspection) => {
                    let entry = match &inspection {
                        Inspection::Mod(record) => {
                            tracing::info!(id = record.id(), version = record.version(), url = %fetch.url, "Found mod");
                            Entry::Mod(record.clone())
                        },
                        Inspection::NotAMod => {
                            tracing::info!(url = %fetch.url, "Archive carries no descriptor");
                            Entry::NotAMod
                        },
                    };
                    cache.store(fetch.digest, entry);
                    for referrer in fetch.referrers {
                        let resolution = match &inspection {
                            Inspection::Mod(record) => {
                                records.push((referrer.position, record.clone()));
                                Resolution::Fetched(record.clone())
                            },
                            Inspection::NotAMod => Resolution::NotAMod,
                        };
                        yield Ok(BuildEvent::AssetResolved { release: referrer.release, asset: referrer.asset, resolution });
                    }
                },
                Err(error) => {
                    let kind = *error;
                    let mut error = Some(error);
                    for referrer in fetch.referrers {
                        summary.failed += 1;
                        let error = match error.take() {
                            Some(error) => {
                                tracing::warn!(release = %referrer.release, asset = %referrer.asset, url = %fetch.url, error = ?error, "Error handling asset");
                                error
                            },
                            None => {
                                tracing::warn!(release = %referrer.release, asset = %referrer.asset, url = %fetch.url, %kind, "Error handling asset");
                                Error::from(kind)
                            },
                        };
                        yield Ok(BuildEvent::AssetFailed { release: referrer.release, asset: referrer.asset, error });
                    }
                },
            }
        }

        summary.collected = cache.gc(&live);
        // Stable under concurrency: ties fall back to listing order.
        records.sort_by(|(a_position, a), (b_position, b)| a.catalog_cmp(b).then(a_position.cmp(b_position)));
        let records: Vec<MetadataRecord> = records.into_iter().map(|(_, record)| record).collect();
        summary.records = records.len();
        tracing::info!(%summary, "Build complete");

        yield Ok(BuildEvent::Complete(Box::new(BuildOutput { records, summary })));
    })
}

async fn download(fetcher: &FetcherHandle, fetch: PendingFetch) -> (PendingFetch, Result<Inspection>) {
    let outcome = fetch_archive(fetcher, &fetch.url).await;
    (fetch, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::{asset, harness, mod_zip};
    use modrepo_source::models::Release;

    async fn events(
        source: &SourceHandle,
        fetcher: &FetcherHandle,
        cache: &mut ArtifactCache,
        options: &BuildOptions,
    ) -> Vec<Result<BuildEvent>> {
        build_stream(source, fetcher, cache, options).collect().await
    }

    #[tokio::test]
    async fn test_event_order() {
        let archive = mod_zip("foo", "1.0.0", &[]);
        let (source, fetcher, _mock) = harness(
            [
                Release::new("docs", [asset("notes.txt", "mem://notes.txt", Some("sha256:notes"))]),
                Release::new("v1", [asset("Mod-1.0.0.zip", "mem://Mod-1.0.0.zip", Some("sha256:v1"))]),
            ],
            [("mem://Mod-1.0.0.zip", archive)],
        );
        let mut cache = ArtifactCache::new();
        let events = events(&source, &fetcher, &mut cache, &BuildOptions::default()).await;
        let events: Vec<BuildEvent> = events.into_iter().map(|event| event.unwrap()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], BuildEvent::Started));
        assert!(matches!(events[1], BuildEvent::Discovered { releases: 2 }));
        assert!(matches!(&events[2], BuildEvent::ReleaseSkipped { release } if release == "docs"));
        assert!(matches!(&events[3], BuildEvent::ReleaseStarted { release } if release == "v1"));
        assert!(matches!(
            &events[4],
            BuildEvent::AssetResolved { release, asset, resolution: Resolution::Fetched(record) }
                if release == "v1" && asset == "Mod-1.0.0.zip" && record.id() == "foo"
        ));
        let BuildEvent::Complete(output) = &events[5] else {
            panic!("expected the stream to complete");
        };
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.summary.releases_skipped, 1);
    }

    #[tokio::test]
    async fn test_listing_failure_terminates_stream() {
        let (source, fetcher) = crate::build::tests::failing_harness();
        let mut cache = ArtifactCache::new();
        let events = events(&source, &fetcher, &mut cache, &BuildOptions::default()).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(BuildEvent::Started)));
        let Err(err) = &events[1] else {
            panic!("expected a listing error");
        };
        assert_eq!(**err, ErrorKind::Listing);
    }

    #[tokio::test]
    async fn test_failed_asset_is_reported_and_stream_continues() {
        let (source, fetcher, _mock) = harness(
            [Release::new(
                "v1",
                [
                    asset("Broken.zip", "mem://Broken.zip", Some("sha256:broken")),
                    asset("Mod.zip", "mem://Mod.zip", Some("sha256:mod")),
                ],
            )],
            [
                ("mem://Broken.zip", b"not a zip".to_vec()),
                ("mem://Mod.zip", mod_zip("foo", "1.0.0", &[])),
            ],
        );
        let mut cache = ArtifactCache::new();
        let events = events(&source, &fetcher, &mut cache, &BuildOptions::default()).await;
        assert!(events.iter().all(Result::is_ok));
        let failures: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Ok(BuildEvent::AssetFailed { asset, error, .. }) => Some((asset.as_str(), **error)),
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![("Broken.zip", ErrorKind::Archive)]);
        assert!(matches!(events.last(), Some(Ok(BuildEvent::Complete(_)))));
    }
}
