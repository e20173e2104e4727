use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use modrepo_extract::error::ErrorKind as ExtractErrorKind;
use modrepo_extract::{Inspection, extract};
use modrepo_source::FetcherHandle;
use tracing::instrument;

/// Downloads the archive at `url` and inspects it.
///
/// The returned record carries the digest computed from the downloaded bytes,
/// never the one declared by the release host.
///
/// # Errors
///
/// - [`Transport`](ErrorKind::Transport) if the download fails or times out.
/// - [`Archive`](ErrorKind::Archive) if the bytes are not a zip archive.
/// - [`Extract`](ErrorKind::Extract) if the descriptor is malformed or
///   incomplete.
#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_archive(fetcher: &FetcherHandle, url: &str) -> Result<Inspection> {
    let bytes = fetcher.fetch(url).await.or_raise(|| ErrorKind::Transport)?;
    match extract(&bytes, url) {
        Ok(inspection) => Ok(inspection),
        Err(err) if matches!(&*err, ExtractErrorKind::InvalidArchive) => Err(err).or_raise(|| ErrorKind::Archive),
        Err(err) => Err(err).or_raise(|| ErrorKind::Extract),
    }
}
