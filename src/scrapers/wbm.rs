use crate::districts;
use crate::models::ListingRecord;
use crate::scrapers::traits::{FetchError, PageFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Site root that relative detail links are resolved against
pub const BASE_URL: &str = "https://www.wbm.de";

/// Public page listing all current WBM apartment offers
pub const OFFERS_URL: &str = "https://www.wbm.de/wohnungen-berlin/angebote/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Why a listing tile could not be turned into a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {css:?}: {reason}")]
    Selector { css: &'static str, reason: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(#[source] url::ParseError),
    #[error("listing has no detail link")]
    MissingLink,
    #[error("detail link {href:?} cannot be resolved: {source}")]
    InvalidLink {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("detail link {0} has no id segment")]
    MissingId(String),
    #[error("unparseable {field} value {text:?}")]
    InvalidNumber { field: &'static str, text: String },
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|err| ExtractError::Selector {
        css,
        reason: format!("{err:?}"),
    })
}

/// Trimmed text content with whitespace runs collapsed
fn text_of(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "-"
}

fn parse_number(field: &'static str, original: &str, cleaned: &str) -> Result<f64, ExtractError> {
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ExtractError::InvalidNumber {
            field,
            text: original.to_string(),
        }),
    }
}

/// "2" or "2,5"
fn parse_rooms(text: &str) -> Result<f64, ExtractError> {
    if is_blank(text) {
        return Ok(0.0);
    }
    parse_number("rooms", text, &text.trim().replace(',', "."))
}

/// "65,5 m²", of which only the leading number counts
fn parse_area(text: &str) -> Result<f64, ExtractError> {
    if is_blank(text) {
        return Ok(0.0);
    }
    let token: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    parse_number("area", text, &token.replace(',', "."))
}

/// "1.200,50 €"
fn parse_rent(text: &str) -> Result<f64, ExtractError> {
    if is_blank(text) {
        return Ok(0.0);
    }
    let cleaned: String = text
        .replace('€', "")
        .replace('.', "")
        .replace(',', ".")
        .split_whitespace()
        .collect();
    parse_number("rent", text, &cleaned)
}

/// Turns WBM listing tiles into [`ListingRecord`]s
pub struct ListingExtractor {
    base: Url,
    tile: Selector,
    link: Selector,
    title: Selector,
    location: Selector,
    detail: Selector,
    detail_value: Selector,
    available: Selector,
    district_pattern: Regex,
    available_pattern: Regex,
}

impl ListingExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            base: Url::parse(BASE_URL).map_err(ExtractError::BaseUrl)?,
            tile: selector("div.vacancy-tile")?,
            link: selector("a.vacancy-tile__link")?,
            title: selector("h2.vacancy-tile__title")?,
            location: selector("p.vacancy-tile__location")?,
            detail: selector(".vacancy-detail")?,
            detail_value: selector(".vacancy-detail__value")?,
            available: selector("p.vacancy-tile__available")?,
            district_pattern: Regex::new(r"(?i)bezirk:\s*([^,]+)")?,
            available_pattern: Regex::new(r"(?i)verfügbar ab\s+(\d{2}\.\d{2}\.\d{4})")?,
        })
    }

    /// Extract every listing tile on a page, one result per tile
    pub fn extract_page(
        &self,
        html: &str,
        found_at: DateTime<FixedOffset>,
    ) -> Vec<Result<ListingRecord, ExtractError>> {
        let document = Html::parse_document(html);
        let tiles: Vec<_> = document.select(&self.tile).collect();
        info!("Found {} listing tiles", tiles.len());

        tiles
            .into_iter()
            .map(|tile| self.extract(tile, found_at))
            .collect()
    }

    /// Parse a single listing tile
    ///
    /// Every sub-element is optional except the detail link, which carries the id.
    pub fn extract(
        &self,
        tile: ElementRef<'_>,
        found_at: DateTime<FixedOffset>,
    ) -> Result<ListingRecord, ExtractError> {
        let href = tile
            .select(&self.link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or(ExtractError::MissingLink)?;

        let url = self
            .base
            .join(href)
            .map_err(|source| ExtractError::InvalidLink {
                href: href.to_string(),
                source,
            })?;

        let id = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .ok_or_else(|| ExtractError::MissingId(url.to_string()))?;

        let title = self.first_text(tile, &self.title);
        let address = self.first_text(tile, &self.location);
        let district = self.district_from_location(&address);

        let mut details = tile.select(&self.detail).map(|detail| {
            detail
                .select(&self.detail_value)
                .next()
                .map(text_of)
                .unwrap_or_default()
        });
        let rooms = parse_rooms(&details.next().unwrap_or_default())?;
        let area = parse_area(&details.next().unwrap_or_default())?;
        let rent = parse_rent(&details.next().unwrap_or_default())?;

        let available_text = self.first_text(tile, &self.available);
        let available_from = self
            .available_pattern
            .captures(&available_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        debug!(%id, rooms, area, rent, "Parsed listing");

        Ok(ListingRecord {
            id,
            title,
            address,
            district,
            rooms,
            area,
            rent,
            price_per_sqm: ListingRecord::compute_price_per_sqm(rent, area),
            available_from,
            url: url.to_string(),
            found_at,
        })
    }

    fn first_text(&self, tile: ElementRef<'_>, selector: &Selector) -> String {
        tile.select(selector).next().map(text_of).unwrap_or_default()
    }

    /// "Bezirk: X" wins; otherwise the last comma-separated part of the location
    fn district_from_location(&self, location: &str) -> String {
        if let Some(labeled) = self.district_pattern.captures(location).and_then(|c| c.get(1)) {
            return districts::normalize(labeled.as_str());
        }

        match location.rsplit_once(',') {
            Some((_, last)) => districts::normalize(last),
            None => String::new(),
        }
    }
}

/// Fetches the WBM offers page over HTTP
pub struct WbmFetcher {
    client: Client,
    url: String,
}

impl WbmFetcher {
    /// Create a fetcher for the public WBM offers page
    pub fn new() -> Result<Self> {
        Self::with_url(OFFERS_URL)
    }

    /// Create a fetcher for a custom offers URL
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for WbmFetcher {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", self.url);

        let http_error = |source| FetchError::Http {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("WBM returned status: {}", status);
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let html = response.text().await.map_err(http_error)?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "WBM"
    }
}
