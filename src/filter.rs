use crate::districts;
use crate::models::ListingRecord;
use serde::{Deserialize, Serialize};

/// Search criteria a listing must satisfy to trigger a notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    /// Minimum number of rooms (inclusive)
    pub min_rooms: f64,
    /// Maximum number of rooms (inclusive)
    pub max_rooms: f64,
    /// Minimum living area in m² (inclusive)
    pub min_area: f64,
    /// Maximum living area in m² (inclusive)
    pub max_area: f64,
    /// Maximum warm rent in €
    pub max_rent: f64,
    /// Maximum rent per m² in €
    pub max_price_per_sqm: f64,
    /// Allowed districts; empty means no restriction
    pub districts: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_rooms: 1.0,
            max_rooms: 5.0,
            min_area: 20.0,
            max_area: 200.0,
            max_rent: 2000.0,
            max_price_per_sqm: 20.0,
            districts: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Parse a comma-separated district allow-list, dropping blank entries
    pub fn parse_districts(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Whether `record` satisfies every criterion in `config`
pub fn matches(record: &ListingRecord, config: &FilterConfig) -> bool {
    if record.rooms < config.min_rooms || record.rooms > config.max_rooms {
        return false;
    }

    if record.area < config.min_area || record.area > config.max_area {
        return false;
    }

    if record.rent > config.max_rent {
        return false;
    }

    if record.price_per_sqm > config.max_price_per_sqm {
        return false;
    }

    if !config.districts.is_empty() {
        let district = districts::normalize(&record.district);
        if district.is_empty() {
            return false;
        }
        return config
            .districts
            .iter()
            .any(|allowed| districts::normalize(allowed) == district);
    }

    true
}
