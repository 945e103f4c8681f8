use crate::models::ListingRecord;
use crate::notifiers::traits::{NotifyError, Notifier};
use async_trait::async_trait;
use tracing::info;

/// Logs matches instead of sending them anywhere
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, record: &ListingRecord) -> Result<(), NotifyError> {
        info!(
            id = %record.id,
            district = %record.district,
            rooms = record.rooms,
            area = record.area,
            rent = record.rent,
            "🏠 {} ({})",
            record.title,
            record.url
        );
        Ok(())
    }

    fn destination(&self) -> &str {
        "console"
    }
}
