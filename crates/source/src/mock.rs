//! In-memory release source and archive fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::models::Release;
use crate::{ArchiveFetcher, ReleaseSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory [`ReleaseSource`].
///
/// The listing sits behind a [`RwLock`] so a test can publish or withdraw
/// releases between two builds that share the same source.
///
/// # Examples
///
/// ```
/// use modrepo_source::mock::MockSource;
/// use modrepo_source::models::{Asset, Release};
/// use modrepo_source::ReleaseSource;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::new([Release::new("v1", [Asset::new("Mod.zip", "mem://Mod.zip", None)])]);
/// assert_eq!(source.releases().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    name: String,
    releases: RwLock<Option<Vec<Release>>>,
}
impl MockSource {
    pub fn new(releases: impl IntoIterator<Item = Release>) -> Self {
        Self {
            name: "mock".to_string(),
            releases: RwLock::new(Some(releases.into_iter().collect())),
        }
    }

    /// A source whose listing always fails.
    pub fn failing() -> Self {
        Self { name: "mock".to_string(), releases: RwLock::new(None) }
    }

    /// Replace the published releases.
    pub async fn publish(&self, releases: impl IntoIterator<Item = Release>) {
        *self.releases.write().await = Some(releases.into_iter().collect());
    }
}

#[async_trait]
impl ReleaseSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn releases(&self) -> Result<Vec<Release>> {
        match self.releases.read().await.as_ref() {
            Some(releases) => Ok(releases.clone()),
            None => exn::bail!(ErrorKind::Listing),
        }
    }
}

enum Response {
    Bytes(Vec<u8>),
    Fail(ErrorKind),
}

/// In-memory [`ArchiveFetcher`] that counts every fetch per URL.
///
/// Unknown URLs fail with a `404` [`Status`](ErrorKind::Status).
#[derive(Default)]
pub struct MockFetcher {
    responses: RwLock<HashMap<String, Response>>,
    delays: HashMap<String, Duration>,
    fetches: RwLock<HashMap<String, usize>>,
}
impl MockFetcher {
    /// Create a mock fetcher serving the given archives.
    pub fn with_archives(archives: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let responses =
            archives.into_iter().map(|(url, bytes)| (url.into(), Response::Bytes(bytes.into()))).collect();
        Self { responses: RwLock::new(responses), ..Self::default() }
    }

    /// Make every fetch of `url` fail with `kind`.
    pub fn with_failure(mut self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.responses.get_mut().insert(url.into(), Response::Fail(kind));
        self
    }

    /// Hold every fetch of `url` for `delay` before answering, to force
    /// out-of-order completion.
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// Serve (or replace) an archive after construction.
    pub async fn serve(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.responses.write().await.insert(url.into(), Response::Bytes(bytes.into()));
    }

    /// How many times `url` has been fetched.
    pub async fn fetches(&self, url: &str) -> usize {
        self.fetches.read().await.get(url).copied().unwrap_or(0)
    }

    /// How many fetches have been made in total.
    pub async fn total_fetches(&self) -> usize {
        self.fetches.read().await.values().sum()
    }
}

#[async_trait]
impl ArchiveFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        *self.fetches.write().await.entry(url.to_string()).or_default() += 1;
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        match self.responses.read().await.get(url) {
            Some(Response::Bytes(bytes)) => Ok(bytes.clone()),
            Some(Response::Fail(kind)) => exn::bail!(kind.clone()),
            None => exn::bail!(ErrorKind::Status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asset;

    #[tokio::test]
    async fn test_mock_source_publish() {
        let source = MockSource::new([]);
        assert!(source.releases().await.unwrap().is_empty());
        source.publish([Release::new("v1", [Asset::new("a.zip", "mem://a", None)])]).await;
        assert_eq!(source.releases().await.unwrap()[0].tag, "v1");
    }

    #[tokio::test]
    async fn test_mock_source_failing() {
        let err = MockSource::failing().releases().await.unwrap_err();
        assert_eq!(*err, ErrorKind::Listing);
    }

    #[tokio::test]
    async fn test_mock_fetcher_counts() {
        let fetcher = MockFetcher::with_archives([("mem://a", b"aaa".to_vec())]).with_failure("mem://b", ErrorKind::Timeout);
        assert_eq!(fetcher.fetch("mem://a").await.unwrap(), b"aaa");
        assert_eq!(fetcher.fetch("mem://a").await.unwrap(), b"aaa");
        assert_eq!(*fetcher.fetch("mem://b").await.unwrap_err(), ErrorKind::Timeout);
        assert_eq!(*fetcher.fetch("mem://missing").await.unwrap_err(), ErrorKind::Status(404));
        assert_eq!(fetcher.fetches("mem://a").await, 2);
        assert_eq!(fetcher.fetches("mem://never").await, 0);
        assert_eq!(fetcher.total_fetches().await, 4);
    }
}
