//! GitHub Releases listing.

use crate::ReleaseSource;
use crate::error::{ErrorKind, Result};
use crate::http::{client, send, transport};
use crate::models::{Asset, Release};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Lists every release of one repository via the REST API, following pages
/// until an empty one is returned.
///
/// Any failure on any page fails the whole listing with
/// [`Listing`](ErrorKind::Listing): a partial listing would make cache garbage
/// collection evict entries for releases that still exist.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_base: String,
    repository: String,
    token: Option<String>,
}
impl GitHubSource {
    /// `repository` is the `owner/repo` slug.
    pub fn new(repository: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client(timeout)?,
            api_base: DEFAULT_API_BASE.to_string(),
            repository: repository.into(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Point at a different API host (GitHub Enterprise, or a local stub).
    pub fn with_api_base(mut self, api_base: impl AsRef<str>) -> Self {
        self.api_base = api_base.as_ref().trim_end_matches('/').to_string();
        self
    }

    fn page_url(&self, page: usize) -> String {
        format!("{}/repos/{}/releases?per_page={PER_PAGE}&page={page}", self.api_base, self.repository)
    }

    #[instrument(level = "debug", skip(self))]
    async fn page(&self, page: usize) -> Result<Vec<Release>> {
        let mut request = self.client.get(self.page_url(page)).header(ACCEPT, MEDIA_TYPE);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let body = transport(send(request).await?.bytes().await)?;
        decode_page(&body)
    }

    async fn all_pages(&self) -> Result<Vec<Release>> {
        let mut releases = Vec::new();
        for page in 1.. {
            let batch = self.page(page).await?;
            if batch.is_empty() {
                break;
            }
            releases.extend(batch);
        }
        Ok(releases)
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    fn name(&self) -> &str {
        &self.repository
    }

    #[instrument(skip(self), fields(repository = %self.repository, releases))]
    async fn releases(&self) -> Result<Vec<Release>> {
        let releases = self.all_pages().await.or_raise(|| ErrorKind::Listing)?;
        tracing::Span::current().record("releases", releases.len());
        Ok(releases)
    }
}

// Every field is optional: drafts, deleted uploads and older API versions all
// omit things, and a missing field must never fail the listing.
#[derive(Debug, Deserialize)]
struct ApiRelease {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    assets: Option<Vec<ApiAsset>>,
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    browser_download_url: Option<String>,
    #[serde(default)]
    digest: Option<String>,
}

impl From<ApiRelease> for Release {
    fn from(release: ApiRelease) -> Self {
        Release::new(
            release.tag_name.unwrap_or_default(),
            release.assets.unwrap_or_default().into_iter().map(|asset| {
                Asset::new(asset.name.unwrap_or_default(), asset.browser_download_url.unwrap_or_default(), asset.digest)
            }),
        )
    }
}

fn decode_page(body: &[u8]) -> Result<Vec<Release>> {
    let page: Vec<ApiRelease> =
        serde_json::from_slice(body).or_raise(|| ErrorKind::InvalidResponse("release listing".to_string()))?;
    Ok(page.into_iter().map(Release::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page() {
        let body = br#"[
            {
                "tag_name": "v2",
                "draft": false,
                "assets": [
                    {
                        "name": "Mod-1.2.0.zip",
                        "browser_download_url": "https://github.com/o/r/releases/download/v2/Mod-1.2.0.zip",
                        "digest": "sha256:abc",
                        "size": 1234
                    },
                    {"name": "notes.txt", "browser_download_url": "https://github.com/o/r/releases/download/v2/notes.txt", "digest": null}
                ]
            },
            {"tag_name": "v1"},
            {"assets": null}
        ]"#;
        let releases = decode_page(body).unwrap();
        assert_eq!(releases.len(), 3);
        assert_eq!(releases[0].tag, "v2");
        assert_eq!(releases[0].assets[0].name, "Mod-1.2.0.zip");
        assert_eq!(releases[0].assets[0].declared_digest(), Some("sha256:abc"));
        assert_eq!(releases[0].assets[1].digest, None);
        assert!(releases[1].assets.is_empty());
        assert_eq!(releases[2].tag, "");
    }

    #[test]
    fn test_decode_empty_page() {
        assert!(decode_page(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_body() {
        let err = decode_page(br#"{"message": "Bad credentials"}"#).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidResponse(_)));
    }

    #[test]
    fn test_page_url() {
        let source = GitHubSource::new("owner/repo", Duration::from_secs(1))
            .unwrap()
            .with_api_base("https://github.example.com/api/v3/");
        assert_eq!(
            source.page_url(3),
            "https://github.example.com/api/v3/repos/owner/repo/releases?per_page=100&page=3"
        );
        assert_eq!(source.name(), "owner/repo");
    }
}
