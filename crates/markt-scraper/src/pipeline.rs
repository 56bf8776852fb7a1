//! The per-run normalization pipeline.
//!
//! Listings are fetched, normalized and geocoded one at a time in page
//! order. The year heuristic assumes chronological page order, and the
//! geocoder's usage policy forbids parallel lookups.

use std::time::Duration;

use chrono::{DateTime, Utc};

use markt_core::{MarketRecord, RawListing, RunSummary};

use crate::address::AddressResolver;
use crate::assemble::assemble;
use crate::client::PageSource;
use crate::date::DateNormalizer;
use crate::error::ScraperError;
use crate::extract::extract_listing;
use crate::gather::extract_market_urls;
use crate::geocode::{CachedGeocoder, Geocoder};
use crate::text::clean_text;

/// Records produced by one run, plus the URLs that could not be fetched.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub records: Vec<MarketRecord>,
    pub failed_urls: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn summary(&self, scraped_at: DateTime<Utc>) -> RunSummary {
        RunSummary::from_records(&self.records, self.failed_urls.clone(), scraped_at)
    }
}

/// Owns every collaborator of a run. The mapping table and the geocode
/// cache are injected here rather than held globally.
pub struct MarketPipeline<P, G> {
    source: P,
    dates: DateNormalizer,
    addresses: AddressResolver,
    geocoder: CachedGeocoder<G>,
    page_delay: Duration,
}

impl<P: PageSource, G: Geocoder> MarketPipeline<P, G> {
    /// `page_delay` is slept between two consecutive page fetches.
    #[must_use]
    pub fn new(
        source: P,
        dates: DateNormalizer,
        addresses: AddressResolver,
        geocoder: CachedGeocoder<G>,
        page_delay: Duration,
    ) -> Self {
        Self {
            source,
            dates,
            addresses,
            geocoder,
            page_delay,
        }
    }

    /// Normalizes one extracted listing into a record.
    pub async fn process_listing(&mut self, raw: RawListing, page_order: usize) -> MarketRecord {
        let raw = clean_listing(raw);

        let standardized_date = self
            .dates
            .normalize(&raw.raw_date_text, &raw.title, page_order);
        let address = self.addresses.resolve(&raw.raw_location_lines, &raw.title);
        let coordinates = self.geocoder.resolve(&address.geocode_query).await;

        assemble(raw, standardized_date, address, coordinates, page_order)
    }

    /// Fetches and processes every URL in order. A page that cannot be
    /// fetched is logged and listed in [`RunReport::failed_urls`]; the run
    /// continues with the next one.
    pub async fn run(&mut self, urls: &[String]) -> RunReport {
        let mut report = RunReport::default();
        let total = urls.len();

        for (index, url) in urls.iter().enumerate() {
            let page_order = index + 1;
            if index > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let html = match self.source.fetch_page(url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!(url, page_order, error = %e, "failed to fetch market page");
                    report.failed_urls.push(url.clone());
                    continue;
                }
            };

            let raw = extract_listing(&html, url);
            let record = self.process_listing(raw, page_order).await;
            tracing::info!(
                url,
                page_order,
                total,
                title = %record.listing.title,
                date = %record.standardized_date,
                geocoded = record.coordinates.is_resolved(),
                "processed market"
            );
            report.records.push(record);
        }

        tracing::info!(
            records = report.records.len(),
            failed = report.failed_urls.len(),
            geocode_lookups = self.geocoder.network_calls(),
            cached_queries = self.geocoder.cache().len(),
            "run complete"
        );
        report
    }

    #[must_use]
    pub fn geocoder(&self) -> &CachedGeocoder<G> {
        &self.geocoder
    }
}

fn clean_listing(raw: RawListing) -> RawListing {
    RawListing {
        title: clean_text(&raw.title),
        raw_date_text: clean_text(&raw.raw_date_text),
        raw_location_lines: raw
            .raw_location_lines
            .iter()
            .map(|line| clean_text(line))
            .filter(|line| !line.is_empty())
            .collect(),
        source_url: raw.source_url,
        opening_time: clean_text(&raw.opening_time),
        entry_fee: clean_text(&raw.entry_fee),
    }
}

/// Fetches the calendar page and returns its market URLs.
///
/// # Errors
///
/// Returns [`ScraperError`] if the calendar page cannot be fetched or its
/// URL is invalid.
pub async fn gather_market_urls<P: PageSource>(
    source: &P,
    calendar_url: &str,
) -> Result<Vec<String>, ScraperError> {
    tracing::info!(calendar_url, "fetching market calendar");
    let html = source.fetch_page(calendar_url).await?;
    extract_market_urls(&html, calendar_url)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
