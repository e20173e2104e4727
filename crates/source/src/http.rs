//! Plain HTTP archive retrieval.

use crate::ArchiveFetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::instrument;

pub(crate) const USER_AGENT: &str = concat!("modrepo/", env!("CARGO_PKG_VERSION"));

/// Downloads archives with a plain `GET`, bounded by a whole-request timeout.
///
/// A request that runs past the timeout fails with
/// [`Timeout`](ErrorKind::Timeout); a non-2xx response fails with
/// [`Status`](ErrorKind::Status).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}
impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self { client: client(timeout)? })
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = send(self.client.get(url)).await?;
        let bytes = transport(response.bytes().await)?;
        tracing::debug!(bytes = bytes.len(), "Downloaded archive");
        Ok(bytes.to_vec())
    }
}

pub(crate) fn client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .or_raise(|| ErrorKind::Transport("unable to build HTTP client".to_string()))
}

/// Send a request, turning transport failures and non-success statuses into
/// errors.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = transport(request.send().await)?;
    let status = response.status();
    if !status.is_success() {
        exn::bail!(ErrorKind::Status(status.as_u16()));
    }
    Ok(response)
}

pub(crate) fn transport<T>(result: reqwest::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_timeout() => Err(err).or_raise(|| ErrorKind::Timeout),
        Err(err) => {
            let message = err.to_string();
            Err(err).or_raise(|| ErrorKind::Transport(message))
        },
    }
}
