use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Reference timezone for listing timestamps and the active-hours window
pub const TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Current wall-clock time in Berlin
pub fn berlin_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&TIMEZONE)
}

/// One apartment observed on the listings page.
///
/// Numeric fields use `0.0` for "could not be parsed". `price_per_sqm` is
/// persisted for inspection but always derived from `rent` and `area`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub address: String,
    pub district: String,
    pub rooms: f64,
    pub area: f64,
    pub rent: f64,
    pub price_per_sqm: f64,
    pub available_from: String,
    pub url: String,
    pub found_at: DateTime<FixedOffset>,
}

impl ListingRecord {
    /// Rent per square meter rounded to cents, `0.0` when the area is unknown
    pub fn compute_price_per_sqm(rent: f64, area: f64) -> f64 {
        if area > 0.0 {
            (rent / area * 100.0).round() / 100.0
        } else {
            0.0
        }
    }
}
