use crate::filter::{self, FilterConfig};
use crate::models::{berlin_now, ListingRecord};
use crate::notifiers::Notifier;
use crate::scrapers::{FetchError, ListingExtractor, PageFetcher};
use crate::store::KnownSetStore;
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// One scrape cycle: extract, dedup, filter, notify, persist
pub struct Pipeline {
    extractor: ListingExtractor,
    filter: FilterConfig,
    notifier: Box<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        extractor: ListingExtractor,
        filter: FilterConfig,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            extractor,
            filter,
            notifier,
        }
    }

    /// Fetch the page and run a cycle on it
    ///
    /// A fetch error aborts the cycle before the store is touched.
    pub async fn scrape(
        &self,
        fetcher: &dyn PageFetcher,
        store: &mut KnownSetStore,
    ) -> Result<usize, FetchError> {
        info!("Starting {} scrape", fetcher.source_name());
        let markup = fetcher.fetch_page().await?;
        Ok(self.run_cycle(&markup, store).await)
    }

    /// Process one page snapshot and return the number of listings notified
    pub async fn run_cycle(&self, page_markup: &str, store: &mut KnownSetStore) -> usize {
        let listings = extract_listings(&self.extractor, page_markup, berlin_now().fixed_offset());

        // ids are checked against the store as it was when the cycle began
        // plus the listings already taken from this page
        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        for listing in listings {
            if store.contains(&listing.id) || !seen.insert(listing.id.clone()) {
                debug!(id = %listing.id, "Already known");
                continue;
            }
            fresh.push(listing);
        }

        let mut notified = 0;
        for listing in &fresh {
            if !filter::matches(listing, &self.filter) {
                debug!(id = %listing.id, "Does not match filter");
                continue;
            }

            match self.notifier.notify(listing).await {
                Ok(()) => notified += 1,
                Err(e) => error!(
                    id = %listing.id,
                    destination = self.notifier.destination(),
                    "Failed to send notification: {}",
                    e
                ),
            }
        }

        let added = fresh.len();
        for listing in fresh {
            store.append(listing);
        }

        if let Err(e) = store.persist() {
            error!("Failed to save known listings: {}", e);
        }

        if notified > 0 {
            info!("{} new matching listings found and notified", notified);
        } else {
            info!("No new matching listings ({} new, {} known)", added, store.len());
        }

        notified
    }
}

/// Extract all usable listings from a page, logging and skipping bad tiles
pub fn extract_listings(
    extractor: &ListingExtractor,
    page_markup: &str,
    found_at: DateTime<FixedOffset>,
) -> Vec<ListingRecord> {
    extractor
        .extract_page(page_markup, found_at)
        .into_iter()
        .filter_map(|result| match result {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Failed to parse listing: {}", e);
                None
            }
        })
        .collect()
}
