pub mod config;
pub mod districts;
pub mod filter;
pub mod logging;
pub mod models;
pub mod notifiers;
pub mod pipeline;
pub mod schedule;
pub mod scrapers;
pub mod store;

pub use filter::FilterConfig;
pub use models::ListingRecord;
pub use pipeline::Pipeline;
pub use store::KnownSetStore;
