pub mod traits;
pub mod wbm;

pub use traits::{FetchError, PageFetcher};
pub use wbm::{ExtractError, ListingExtractor, WbmFetcher};
