//! Streaming HTTP image fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport, timeout or HTTP status failure from the client.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// Failure with a preformatted reason, produced by non-HTTP fetchers.
    #[error("{0}")]
    Failed(String),
}

/// An opened download: the advertised size and the body as it arrives.
pub struct FetchedBody {
    /// Total size in bytes when the server sent a usable Content-Length.
    pub total: Option<u64>,
    /// Body chunks in arrival order.
    pub stream: BoxStream<'static, Result<Bytes, FetchError>>,
}

/// Source of image bytes, keyed by URL.
///
/// The production implementation is [`HttpFetcher`]; tests substitute
/// in-memory fetchers to drive the engine without a network.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Open a streaming download for `url`.
    ///
    /// A non-success HTTP status is an error, not a body.
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError>;
}

/// [`ImageFetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose connect and per-read timeouts are both `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(concat!("magpie/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total = response.content_length();
        let stream = response.bytes_stream().map_err(FetchError::Http).boxed();

        Ok(FetchedBody { total, stream })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Failed("connection reset".to_string());
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(20)).is_ok());
    }
}
