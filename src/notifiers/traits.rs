use crate::models::ListingRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification rejected ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Channel that announces newly matched listings
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce one listing
    async fn notify(&self, record: &ListingRecord) -> Result<(), NotifyError>;

    /// Where notifications are delivered, e.g. a chat id
    fn destination(&self) -> &str;
}
