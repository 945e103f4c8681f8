use async_trait::async_trait;
use thiserror::Error;

/// Failure to retrieve the listings page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Source of raw listings markup
/// Implemented per housing company so further sites can be added later
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the current listings page as HTML
    async fn fetch_page(&self) -> Result<String, FetchError>;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}
